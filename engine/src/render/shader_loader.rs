//! Shader Loading Utilities
//!
//! Every pass program is the shared preamble (`shaders/common.wgsl`: the
//! frame uniform block and the fullscreen vertex stage) followed by the
//! pass's own fragment stage. Sources are embedded at compile time.

/// Embedded shaders that are compiled into the binary.
pub mod embedded {
    pub const COMMON: &str = include_str!("../../../shaders/common.wgsl");
    pub const STATE: &str = include_str!("../../../shaders/state.wgsl");
    pub const NOISE: &str = include_str!("../../../shaders/noise.wgsl");
    pub const CLOUDS: &str = include_str!("../../../shaders/clouds.wgsl");
    pub const ACCUMULATE: &str = include_str!("../../../shaders/accumulate.wgsl");
    pub const GODRAYS: &str = include_str!("../../../shaders/godrays.wgsl");
    pub const BLIT: &str = include_str!("../../../shaders/blit.wgsl");

    /// (label, fragment body) for every pass program
    pub const PASS_PROGRAMS: &[(&str, &str)] = &[
        ("state", STATE),
        ("noise", NOISE),
        ("clouds", CLOUDS),
        ("accumulate", ACCUMULATE),
        ("godrays", GODRAYS),
        ("blit", BLIT),
    ];
}

/// Prepend the shared preamble to a pass body.
pub fn compose(body: &str) -> String {
    let mut source = String::with_capacity(embedded::COMMON.len() + body.len() + 1);
    source.push_str(embedded::COMMON);
    source.push('\n');
    source.push_str(body);
    source
}

/// Every pass program, composed and ready to compile.
pub fn composed_programs() -> Vec<(&'static str, String)> {
    embedded::PASS_PROGRAMS
        .iter()
        .map(|(label, body)| (*label, compose(body)))
        .collect()
}

/// Create a wgpu shader module from a pass body.
pub fn create_shader_module(device: &wgpu::Device, label: &str, body: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(compose(body).into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_prepends_preamble() {
        let source = compose("fn body() {}");
        assert!(source.starts_with(embedded::COMMON));
        assert!(source.ends_with("fn body() {}"));
    }

    #[test]
    fn test_every_program_has_fragment_entry() {
        for (label, source) in composed_programs() {
            assert!(source.contains("fn vs_main"), "{label} missing vertex stage");
            assert!(source.contains("fn fs_main"), "{label} missing fragment stage");
        }
    }
}
