//! wgpu implementation of [`EnvironmentRenderer`].

use skylight_sky::{CubeTargetDescriptor, EnvironmentRenderer, LightState, SkyMaterialParams};

use crate::cube::{
    CUBE_FACES, CubeFace, IRRADIANCE_SIZE, RADIANCE_SIZE, cube_mip_levels, cube_sampler_descriptor,
    cube_texture_descriptor, equirect_texture_descriptor, face_view_proj, texel_format,
};
use crate::gpu::GpuContext;
use crate::irradiance::IrradianceConvolution;
use crate::light_binding::LightBinding;
use crate::mipmap::{MipmapGenerator, layer_view};
use crate::sky_pass::{SkyPass, SkyPassUniform};

/// Texel format of every environment target.
pub const ENVIRONMENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// How an [`EnvironmentTexture`] should be sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentLayout {
    Cube,
    Equirect,
}

/// Sampling handle for the scene's environment slot.
#[derive(Clone, Debug)]
pub struct EnvironmentTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub layout: EnvironmentLayout,
}

/// A six-layer cube render target with its mip chain.
pub struct CubeTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    resolution: u32,
    mip_levels: u32,
    near: f32,
    far: f32,
}

impl CubeTarget {
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }
}

/// An equirectangular irradiance map.
pub struct IrradianceTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl IrradianceTarget {
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Renders the sky into environment targets on a headless device.
pub struct WgpuEnvironmentRenderer {
    ctx: GpuContext,
    sky_pass: SkyPass,
    mipmaps: MipmapGenerator,
    convolution: IrradianceConvolution,
    irradiance_sampler: wgpu::Sampler,
    light: LightBinding,
}

impl WgpuEnvironmentRenderer {
    pub fn new(ctx: GpuContext) -> Self {
        let sky_pass = SkyPass::new(&ctx, ENVIRONMENT_FORMAT);
        let mipmaps = MipmapGenerator::new(&ctx.device, ENVIRONMENT_FORMAT);
        let convolution = IrradianceConvolution::new(&ctx, ENVIRONMENT_FORMAT);
        let irradiance_sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("irradiance-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let light = LightBinding::new(&ctx.device);

        Self {
            ctx,
            sky_pass,
            mipmaps,
            convolution,
            irradiance_sampler,
            light,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    pub fn light_binding(&self) -> &LightBinding {
        &self.light
    }

    /// Push the frame's directional light to its uniform buffer.
    pub fn upload_light(&self, light: &LightState) {
        self.light.write(&self.ctx.queue, light);
    }

    /// Block until all submitted work has finished.
    pub fn wait_idle(&self) {
        if let Err(err) = self.ctx.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        }) {
            log::warn!("Device poll failed: {err}");
        }
    }
}

impl EnvironmentRenderer for WgpuEnvironmentRenderer {
    type CubeTarget = CubeTarget;
    type IrradianceTarget = IrradianceTarget;
    type Texture = EnvironmentTexture;

    fn create_cube_target(&mut self, desc: &CubeTargetDescriptor) -> CubeTarget {
        debug_assert_eq!(texel_format(desc.texel_type), ENVIRONMENT_FORMAT);
        let texture = self.ctx.device.create_texture(&cube_texture_descriptor(desc));
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("environment-cube-view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = self.ctx.device.create_sampler(&cube_sampler_descriptor(desc));

        CubeTarget {
            texture,
            view,
            sampler,
            resolution: desc.resolution,
            mip_levels: cube_mip_levels(desc),
            near: desc.near,
            far: desc.far,
        }
    }

    fn capture_cube(&mut self, target: &mut CubeTarget, sky: &SkyMaterialParams) {
        for face in CubeFace::ALL {
            let uniform =
                SkyPassUniform::perspective(sky, face_view_proj(face, target.near, target.far));
            self.sky_pass.write_slot(&self.ctx.queue, face.layer(), &uniform);
        }

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cube-capture-encoder"),
            });
        for face in CubeFace::ALL {
            let view = layer_view(&target.texture, face.layer(), 0);
            self.sky_pass
                .draw(&mut encoder, &view, face.layer(), "cube-capture-pass");
        }
        self.mipmaps.generate(
            &self.ctx.device,
            &mut encoder,
            &target.texture,
            CUBE_FACES,
            target.mip_levels,
        );
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    fn cube_texture(&self, target: &CubeTarget) -> EnvironmentTexture {
        EnvironmentTexture {
            view: target.view.clone(),
            sampler: target.sampler.clone(),
            layout: EnvironmentLayout::Cube,
        }
    }

    fn bake_irradiance(&mut self, sky: &SkyMaterialParams) -> IrradianceTarget {
        let device = &self.ctx.device;
        let radiance =
            device.create_texture(&equirect_texture_descriptor("environment-radiance", RADIANCE_SIZE));
        let radiance_view = radiance.create_view(&wgpu::TextureViewDescriptor::default());
        let texture = device.create_texture(&equirect_texture_descriptor(
            "environment-irradiance",
            IRRADIANCE_SIZE,
        ));
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.sky_pass
            .write_slot(&self.ctx.queue, 0, &SkyPassUniform::equirect(sky));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("irradiance-encoder"),
        });
        self.sky_pass
            .draw(&mut encoder, &radiance_view, 0, "radiance-capture-pass");
        self.convolution
            .convolve(device, &mut encoder, &radiance_view, &view);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        // Only the convolved map outlives the bake.
        radiance.destroy();

        IrradianceTarget {
            texture,
            view,
            sampler: self.irradiance_sampler.clone(),
        }
    }

    fn irradiance_texture(&self, target: &IrradianceTarget) -> EnvironmentTexture {
        EnvironmentTexture {
            view: target.view.clone(),
            sampler: target.sampler.clone(),
            layout: EnvironmentLayout::Equirect,
        }
    }

    fn dispose_cube(&mut self, target: CubeTarget) {
        target.texture.destroy();
    }

    fn dispose_irradiance(&mut self, target: IrradianceTarget) {
        target.texture.destroy();
    }
}
