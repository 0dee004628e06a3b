//! SDF-based WebGPU render pipeline
//!
//! Renders the entire scene in fragment shader using signed distance fields.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Level};

/// Maximum number of platforms per level
const MAX_PLATFORMS: usize = 16;
/// Maximum number of kids per level
const MAX_KIDS: usize = 8;

const KID_SEEN: u32 = 1;
const KID_SCARED: u32 = 2;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Globals {
    resolution: [f32; 2], // offset 0
    time: f32,            // offset 8
    pixel_ratio: f32,     // offset 12
    camera_x: f32,        // offset 16
    level_width: f32,     // offset 20
    platform_count: u32,  // offset 24
    kid_count: u32,       // offset 28
    ghost: [f32; 4],      // offset 32 - center xy, facing, cooldown ratio
    background: [f32; 4], // offset 48
    rain_drops: u32,      // offset 64
    glow: u32,            // offset 68
    paused: u32,          // offset 72
    _pad: u32,            // pad to 80 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct PlatformData {
    rect: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct KidData {
    pos: [f32; 2],
    facing: f32,
    flags: u32, // bit0 = seen, bit1 = scared
}

/// Per-frame globals from the game state
pub(crate) fn pack_globals(
    state: &GameState,
    settings: &Settings,
    size: (u32, u32),
    pixel_ratio: f32,
    elapsed: f32,
) -> Globals {
    let level = state.current_level();
    let player = &state.player;
    let center = player.center();
    let cooldown_ratio = if state.tuning.scare_cooldown > 0.0 {
        (player.scare_cooldown / state.tuning.scare_cooldown).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let [r, g, b] = level.background;

    Globals {
        resolution: [size.0 as f32, size.1 as f32],
        time: if settings.rain_animated() { elapsed } else { 0.0 },
        pixel_ratio: pixel_ratio.max(0.1),
        camera_x: state.camera.offset_x,
        level_width: LEVEL_WIDTH,
        platform_count: level.platforms.len().min(MAX_PLATFORMS) as u32,
        kid_count: level.kids.len().min(MAX_KIDS) as u32,
        ghost: [center.x, center.y, player.facing.sign(), cooldown_ratio],
        background: [r, g, b, 1.0],
        rain_drops: settings.rain_drops(),
        glow: settings.glow_enabled() as u32,
        paused: (state.phase == GamePhase::Paused) as u32,
        _pad: 0,
    }
}

pub(crate) fn pack_platforms(level: &Level) -> [PlatformData; MAX_PLATFORMS] {
    let mut data = [PlatformData::zeroed(); MAX_PLATFORMS];
    for (slot, p) in data.iter_mut().zip(&level.platforms) {
        slot.rect = [p.x, p.y, p.w, p.h];
    }
    data
}

pub(crate) fn pack_kids(level: &Level) -> [KidData; MAX_KIDS] {
    let mut data = [KidData::zeroed(); MAX_KIDS];
    for (slot, kid) in data.iter_mut().zip(&level.kids) {
        let mut flags = 0;
        if kid.seen {
            flags |= KID_SEEN;
        }
        if kid.scared {
            flags |= KID_SCARED;
        }
        *slot = KidData {
            pos: [kid.pos.x, kid.pos.y],
            facing: kid.facing.sign(),
            flags,
        };
    }
    data
}

/// Renderer setup failures
#[derive(Debug)]
pub enum RenderInitError {
    Device(wgpu::RequestDeviceError),
    NoSurfaceFormat,
}

impl fmt::Display for RenderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderInitError::Device(e) => write!(f, "failed to create device: {e}"),
            RenderInitError::NoSurfaceFormat => write!(f, "surface reports no formats"),
        }
    }
}

impl std::error::Error for RenderInitError {}

impl From<wgpu::RequestDeviceError> for RenderInitError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderInitError::Device(e)
    }
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    platforms_buffer: wgpu::Buffer,
    kids_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    pixel_ratio: f32,
    start_time: f64,
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Result<Self, RenderInitError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        // Colors are authored in sRGB, so prefer a non-sRGB target
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderInitError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let platforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("platforms"),
            size: (std::mem::size_of::<PlatformData>() * MAX_PLATFORMS) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let kids_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kids"),
            size: (std::mem::size_of::<KidData>() * MAX_KIDS) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: platforms_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: kids_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            platforms_buffer,
            kids_buffer,
            bind_group,
            size: (width, height),
            pixel_ratio,
            start_time: 0.0,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    /// Update GPU buffers from game state and render
    pub fn render(
        &mut self,
        state: &GameState,
        settings: &Settings,
        time: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        // time is ms from requestAnimationFrame
        let elapsed = ((time - self.start_time).max(0.0) / 1000.0) as f32;
        let level = state.current_level();

        let globals = pack_globals(state, settings, self.size, self.pixel_ratio, elapsed);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue.write_buffer(
            &self.platforms_buffer,
            0,
            bytemuck::cast_slice(&pack_platforms(level)),
        );
        self.queue
            .write_buffer(&self.kids_buffer, 0, bytemuck::cast_slice(&pack_kids(level)));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
