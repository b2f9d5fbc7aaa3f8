//! Cube and equirectangular target geometry plus descriptor conversion.
//!
//! Everything here is pure so the face layout can be checked without a GPU.
//! Faces follow the WebGPU cube convention (layer order +X, -X, +Y, -Y, +Z,
//! -Z); row 0 of each face is its top edge.

use glam::{Mat4, Vec3, Vec4};
use skylight_sky::{CubeTargetDescriptor, Filter, TexelType};

/// Number of layers in a cube texture.
pub const CUBE_FACES: u32 = 6;

/// Size of the equirectangular radiance capture used for convolution.
pub const RADIANCE_SIZE: (u32, u32) = (128, 64);

/// Size of the equirectangular irradiance map.
pub const IRRADIANCE_SIZE: (u32, u32) = (32, 16);

/// Calculates the number of mip levels for the given dimensions.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    width.max(height).max(1).ilog2() + 1
}

/// One face of a cube target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in array-layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn layer(self) -> u32 {
        self as u32
    }

    /// Direction through the center of the face.
    pub fn forward(self) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::X,
            CubeFace::NegativeX => Vec3::NEG_X,
            CubeFace::PositiveY => Vec3::Y,
            CubeFace::NegativeY => Vec3::NEG_Y,
            CubeFace::PositiveZ => Vec3::Z,
            CubeFace::NegativeZ => Vec3::NEG_Z,
        }
    }

    /// Direction towards the top edge of the face.
    pub fn up(self) -> Vec3 {
        match self {
            CubeFace::PositiveY => Vec3::NEG_Z,
            CubeFace::NegativeY => Vec3::Z,
            _ => Vec3::Y,
        }
    }

    /// Left-handed view matrix for a camera at the origin looking through
    /// this face.
    pub fn view_matrix(self) -> Mat4 {
        Mat4::look_to_lh(Vec3::ZERO, self.forward(), self.up())
    }
}

/// 90 degree square projection shared by all faces.
pub fn cube_projection(near: f32, far: f32) -> Mat4 {
    Mat4::perspective_lh(std::f32::consts::FRAC_PI_2, 1.0, near, far)
}

/// Combined view-projection for `face`.
pub fn face_view_proj(face: CubeFace, near: f32, far: f32) -> Mat4 {
    cube_projection(near, far) * face.view_matrix()
}

/// World direction seen through `(ndc_x, ndc_y)` by a camera at the origin.
pub fn ndc_to_direction(inv_view_proj: Mat4, ndc_x: f32, ndc_y: f32) -> Vec3 {
    let point = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    (point.truncate() / point.w).normalize()
}

/// World direction for texture coordinate `(u, v)` of an equirectangular map.
///
/// `u` runs west to east through north at `0.5`; `v = 0` is the zenith.
pub fn equirect_direction(u: f32, v: f32) -> Vec3 {
    let lon = (u - 0.5) * std::f32::consts::TAU;
    let lat = (0.5 - v) * std::f32::consts::PI;
    Vec3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos())
}

/// Solid angle covered by one texel in `row` of a `width` x `height`
/// equirectangular map.
pub fn texel_solid_angle(row: u32, width: u32, height: u32) -> f32 {
    let v = (row as f32 + 0.5) / height as f32;
    let lat = (0.5 - v) * std::f32::consts::PI;
    (std::f32::consts::TAU / width as f32) * (std::f32::consts::PI / height as f32) * lat.cos()
}

pub fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

/// No mip filter means sampling the nearest level.
pub fn mipmap_filter_mode(filter: Option<Filter>) -> wgpu::MipmapFilterMode {
    match filter {
        Some(Filter::Linear) => wgpu::MipmapFilterMode::Linear,
        Some(Filter::Nearest) | None => wgpu::MipmapFilterMode::Nearest,
    }
}

pub fn texel_format(texel_type: TexelType) -> wgpu::TextureFormat {
    match texel_type {
        TexelType::HalfFloat => wgpu::TextureFormat::Rgba16Float,
    }
}

/// Mip levels a cube target built from `desc` carries.
pub fn cube_mip_levels(desc: &CubeTargetDescriptor) -> u32 {
    if desc.generate_mipmaps {
        mip_level_count(desc.resolution, desc.resolution)
    } else {
        1
    }
}

pub fn cube_texture_descriptor(desc: &CubeTargetDescriptor) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some("environment-cube"),
        size: wgpu::Extent3d {
            width: desc.resolution,
            height: desc.resolution,
            depth_or_array_layers: CUBE_FACES,
        },
        mip_level_count: cube_mip_levels(desc),
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: texel_format(desc.texel_type),
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    }
}

pub fn cube_sampler_descriptor(desc: &CubeTargetDescriptor) -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("environment-cube-sampler"),
        mag_filter: filter_mode(desc.mag_filter),
        min_filter: filter_mode(desc.min_filter),
        mipmap_filter: mipmap_filter_mode(desc.mipmap_filter),
        ..Default::default()
    }
}

/// Descriptor for a single-layer equirectangular target.
pub fn equirect_texture_descriptor(
    label: &'static str,
    (width, height): (u32, u32),
) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_dir(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected.normalize()).length() < 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn direction(face: CubeFace, x: f32, y: f32) -> Vec3 {
        ndc_to_direction(face_view_proj(face, 1.0, 20_000.0).inverse(), x, y)
    }

    #[test]
    fn test_mipmap_level_count_calculation() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(16, 16), 5);
        assert_eq!(mip_level_count(64, 64), 7);
        assert_eq!(mip_level_count(512, 256), 10);
        assert_eq!(mip_level_count(2048, 2048), 12);
    }

    #[test]
    fn test_face_centers_look_along_axes() {
        for face in CubeFace::ALL {
            assert_dir(direction(face, 0.0, 0.0), face.forward());
        }
    }

    #[test]
    fn test_face_edges_follow_cube_convention() {
        // Right and top edge directions from the WebGPU cube face table.
        let cases = [
            (CubeFace::PositiveX, Vec3::NEG_Z, Vec3::Y),
            (CubeFace::NegativeX, Vec3::Z, Vec3::Y),
            (CubeFace::PositiveY, Vec3::X, Vec3::NEG_Z),
            (CubeFace::NegativeY, Vec3::X, Vec3::Z),
            (CubeFace::PositiveZ, Vec3::X, Vec3::Y),
            (CubeFace::NegativeZ, Vec3::NEG_X, Vec3::Y),
        ];
        for (face, right, top) in cases {
            assert_dir(direction(face, 1.0, 0.0), face.forward() + right);
            assert_dir(direction(face, 0.0, 1.0), face.forward() + top);
        }
    }

    #[test]
    fn test_faces_are_in_layer_order() {
        let layers: Vec<u32> = CubeFace::ALL.iter().map(|f| f.layer()).collect();
        assert_eq!(layers, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_equirect_poles_and_north() {
        assert_dir(equirect_direction(0.5, 0.0), Vec3::Y);
        assert_dir(equirect_direction(0.5, 1.0), Vec3::NEG_Y);
        assert_dir(equirect_direction(0.5, 0.5), Vec3::Z);
        assert_dir(equirect_direction(0.75, 0.5), Vec3::X);
    }

    #[test]
    fn test_texel_solid_angles_cover_sphere() {
        let (width, height) = RADIANCE_SIZE;
        let total: f32 = (0..height)
            .map(|row| texel_solid_angle(row, width, height) * width as f32)
            .sum();
        assert!((total - 4.0 * std::f32::consts::PI).abs() < 1e-2, "total {total}");
    }

    #[test]
    fn test_cube_descriptor_conversion() {
        let desc = CubeTargetDescriptor::with_resolution(64);
        let texture = cube_texture_descriptor(&desc);
        assert_eq!(texture.size.depth_or_array_layers, 6);
        assert_eq!(texture.size.width, 64);
        assert_eq!(texture.mip_level_count, 7);
        assert_eq!(texture.format, wgpu::TextureFormat::Rgba16Float);
        assert!(texture.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));

        let sampler = cube_sampler_descriptor(&desc);
        assert_eq!(sampler.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(sampler.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(sampler.mipmap_filter, wgpu::MipmapFilterMode::Linear);
    }

    #[test]
    fn test_no_mipmaps_means_one_level() {
        let mut desc = CubeTargetDescriptor::with_resolution(256);
        desc.generate_mipmaps = false;
        assert_eq!(cube_texture_descriptor(&desc).mip_level_count, 1);
        assert_eq!(mipmap_filter_mode(None), wgpu::MipmapFilterMode::Nearest);
    }
}
