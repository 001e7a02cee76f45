//! Weather Maps
//!
//! Two painted 2D maps that steer where clouds form, sampled read-only by
//! the scene pass:
//! - **coverage**: r = coverage, g = cloud type, b = moisture, a = development
//! - **layer**: r = base altitude, g = top altitude (meters), a = how much the
//!   map overrides the global layer altitudes
//!
//! Texels are stored as `Rgba16Float`. A uniform default fill lets the
//! renderer run before anything has been painted.

use glam::Vec4;
use half::f16;

/// Weather map resolution in texels per side
pub const WEATHER_MAP_SIZE: u32 = 256;

/// Default coverage texel: partly cloudy, mixed type, moderate moisture
pub const DEFAULT_COVERAGE: Vec4 = Vec4::new(0.55, 0.5, 0.6, 0.5);
/// Default layer texel: no override of the global altitudes
pub const DEFAULT_LAYER: Vec4 = Vec4::new(1500.0, 4000.0, 0.0, 0.0);

/// Pack RGBA f32 texels into little-endian half floats.
pub fn pack_rgba16f(texels: &[Vec4]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(texels.len() * 8);
    for texel in texels {
        for channel in texel.to_array() {
            bytes.extend_from_slice(&f16::from_f32(channel).to_bits().to_le_bytes());
        }
    }
    bytes
}

/// Weather textures and their shared sampler.
pub struct WeatherMaps {
    coverage: wgpu::Texture,
    coverage_view: wgpu::TextureView,
    layer: wgpu::Texture,
    layer_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl WeatherMaps {
    /// Create both maps filled with the default texels.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let (coverage, coverage_view) = create_map(device, "Weather Coverage Map");
        let (layer, layer_view) = create_map(device, "Weather Layer Map");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Weather Map Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let maps = Self {
            coverage,
            coverage_view,
            layer,
            layer_view,
            sampler,
        };
        maps.fill_coverage(queue, DEFAULT_COVERAGE);
        maps.fill_layer(queue, DEFAULT_LAYER);
        log::debug!("Weather maps initialized at {0}x{0}", WEATHER_MAP_SIZE);
        maps
    }

    pub fn coverage_view(&self) -> &wgpu::TextureView {
        &self.coverage_view
    }

    pub fn layer_view(&self) -> &wgpu::TextureView {
        &self.layer_view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Replace the whole coverage map. `texels` is row-major,
    /// `WEATHER_MAP_SIZE`² long; shorter input is ignored.
    pub fn write_coverage(&self, queue: &wgpu::Queue, texels: &[Vec4]) -> bool {
        write_map(queue, &self.coverage, texels)
    }

    /// Replace the whole layer map (same layout as [`Self::write_coverage`]).
    pub fn write_layer(&self, queue: &wgpu::Queue, texels: &[Vec4]) -> bool {
        write_map(queue, &self.layer, texels)
    }

    pub fn fill_coverage(&self, queue: &wgpu::Queue, value: Vec4) {
        write_map(queue, &self.coverage, &uniform_fill(value));
    }

    pub fn fill_layer(&self, queue: &wgpu::Queue, value: Vec4) {
        write_map(queue, &self.layer, &uniform_fill(value));
    }
}

fn uniform_fill(value: Vec4) -> Vec<Vec4> {
    vec![value; (WEATHER_MAP_SIZE * WEATHER_MAP_SIZE) as usize]
}

fn create_map(device: &wgpu::Device, label: &str) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: WEATHER_MAP_SIZE,
            height: WEATHER_MAP_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        ..Default::default()
    });
    (texture, view)
}

fn write_map(queue: &wgpu::Queue, texture: &wgpu::Texture, texels: &[Vec4]) -> bool {
    let expected = (WEATHER_MAP_SIZE * WEATHER_MAP_SIZE) as usize;
    if texels.len() < expected {
        log::warn!("Weather map write ignored: {} texels, expected {}", texels.len(), expected);
        return false;
    }

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &pack_rgba16f(&texels[..expected]),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(WEATHER_MAP_SIZE * 8), // 4 channels x f16
            rows_per_image: Some(WEATHER_MAP_SIZE),
        },
        wgpu::Extent3d {
            width: WEATHER_MAP_SIZE,
            height: WEATHER_MAP_SIZE,
            depth_or_array_layers: 1,
        },
    );
    true
}
