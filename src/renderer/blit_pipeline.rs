pub struct BlitPipeline {
    pub pipeline:    wgpu::RenderPipeline,
    pub texture_bgl: wgpu::BindGroupLayout, // group 0: canvas texture + sampler
}

/// Canvas-sized texture the software framebuffer is copied into every frame.
pub struct CanvasTexture {
    pub texture:    wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
    pub width:      u32,
    pub height:     u32,
}

pub fn create_blit_pipeline(device: &wgpu::Device, output_format: wgpu::TextureFormat) -> BlitPipeline {
    let shader = device.create_shader_module(wgpu::include_wgsl!("shaders/blit_shader.wgsl"));

    let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("blit_texture_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("blit_pipeline_layout"),
        bind_group_layouts: &[&texture_bgl],
        ..Default::default()
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("blit_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[], // positions generated from vertex_index
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: output_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    BlitPipeline { pipeline, texture_bgl }
}

/// Allocate a texture matching the canvas size. Called again whenever the
/// canvas is resized.
pub fn create_canvas_texture(
    device: &wgpu::Device,
    pipeline: &BlitPipeline,
    width: u32,
    height: u32,
) -> CanvasTexture {
    let width = width.max(1);
    let height = height.max(1);

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("canvas_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // The canvas is drawn 1:1 into the letterbox, so nearest keeps pixel art crisp.
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("canvas_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("canvas_bg"),
        layout: &pipeline.texture_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    CanvasTexture { texture, bind_group, width, height }
}
