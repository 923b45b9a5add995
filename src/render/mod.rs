pub mod pipeline;
pub mod selector;

use std::sync::Arc;
use winit::window::Window;

use self::pipeline::SpritePipeline;
use crate::assets::SpriteSheet;
use crate::error::{NekoError, Result};
use crate::pet::sprite::Frame;

/// Device, queue, surface and the sprite pipeline.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub sprite_pipeline: SpritePipeline,
}

#[cfg(windows)]
fn create_instance() -> wgpu::Instance {
    // DX12 only: Vulkan WSI on Windows doesn't support transparent composition.
    // Use DirectComposition presentation for per-pixel alpha transparency.
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::DX12,
        backend_options: wgpu::BackendOptions {
            dx12: wgpu::Dx12BackendOptions {
                presentation_system: wgpu_types::Dx12SwapchainKind::DxgiFromVisual,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    })
}

#[cfg(not(windows))]
fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor::default())
}

/// Prefer an sRGB target so the sRGB sprite textures come out unchanged.
fn pick_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

/// First compositing mode that lets the desktop show through.
fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    use wgpu::CompositeAlphaMode::{Auto, PostMultiplied, PreMultiplied};
    [PreMultiplied, PostMultiplied]
        .into_iter()
        .find(|m| modes.contains(m))
        .unwrap_or(Auto)
}

impl GpuState {
    /// Initialize wgpu and upload every sprite frame.
    pub fn new(window: Arc<Window>, sprites: &SpriteSheet) -> Result<Self> {
        let size = window.inner_size();
        let instance = create_instance();

        let surface = instance
            .create_surface(window)
            .map_err(|e| NekoError::Gpu(format!("failed to create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| NekoError::Gpu(format!("no suitable GPU adapter: {e}")))?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("neko_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            },
        ))
        .map_err(|e| NekoError::Gpu(format!("failed to create device: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats)
            .ok_or_else(|| NekoError::Gpu("surface reports no formats".into()))?;
        let alpha_mode = pick_alpha_mode(&caps.alpha_modes);
        if alpha_mode == wgpu::CompositeAlphaMode::Auto {
            log::warn!(
                "No transparent alpha mode in {:?}, the pet will have a background",
                caps.alpha_modes
            );
        }
        log::info!("Surface: format={format:?}, alpha_mode={alpha_mode:?}");

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let (w, h) = sprites.get(Frame::AWAKE).dimensions();
        log::debug!("Sprite size {w}x{h}, window {}x{}", size.width, size.height);
        let sprite_pipeline = SpritePipeline::new(&device, &queue, format, sprites);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            sprite_pipeline,
        })
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Clear the window and draw `frame`. Returns false when the surface was
    /// unavailable and nothing was presented.
    pub fn draw(&self, frame: Frame) -> bool {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return false;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return false;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return false;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let p = &self.sprite_pipeline;
            render_pass.set_pipeline(&p.pipeline);
            render_pass.set_bind_group(0, p.bind_group(frame), &[]);
            render_pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
            render_pass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..pipeline::QUAD_INDICES.len() as u32, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::CompositeAlphaMode as Alpha;
    use wgpu::TextureFormat as Tf;

    #[test]
    fn srgb_format_preferred() {
        let formats = [Tf::Bgra8Unorm, Tf::Bgra8UnormSrgb, Tf::Rgba8Unorm];
        assert_eq!(pick_format(&formats), Some(Tf::Bgra8UnormSrgb));
        assert_eq!(pick_format(&[Tf::Rgba8Unorm]), Some(Tf::Rgba8Unorm));
        assert_eq!(pick_format(&[]), None);
    }

    #[test]
    fn transparent_alpha_mode_preferred() {
        assert_eq!(
            pick_alpha_mode(&[Alpha::Opaque, Alpha::PostMultiplied, Alpha::PreMultiplied]),
            Alpha::PreMultiplied
        );
        assert_eq!(
            pick_alpha_mode(&[Alpha::Opaque, Alpha::PostMultiplied]),
            Alpha::PostMultiplied
        );
        assert_eq!(pick_alpha_mode(&[Alpha::Opaque]), Alpha::Auto);
    }
}
