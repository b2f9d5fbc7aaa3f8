//! wgpu backend for environment baking: headless device setup, the Preetham
//! sky pass, cube capture with mip generation, irradiance convolution and
//! the directional light uniform.

pub mod cube;
pub mod gpu;
mod irradiance;
mod light_binding;
mod mipmap;
mod renderer;
mod sky_pass;

pub use cube::{CUBE_FACES, CubeFace, IRRADIANCE_SIZE, RADIANCE_SIZE, mip_level_count};
pub use gpu::{GpuContext, GpuContextError};
pub use irradiance::{IRRADIANCE_SHADER_SOURCE, IrradianceConvolution};
pub use light_binding::LightBinding;
pub use mipmap::MipmapGenerator;
pub use renderer::{
    CubeTarget, ENVIRONMENT_FORMAT, EnvironmentLayout, EnvironmentTexture, IrradianceTarget,
    WgpuEnvironmentRenderer,
};
pub use sky_pass::{SKY_SHADER_SOURCE, SkyPass, SkyPassUniform, SkyProjection};
