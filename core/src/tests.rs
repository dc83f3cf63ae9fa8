use mbcrypt_backend::{Capabilities, CapabilityTier, CpuRef, LaneFamily};

use crate::{
    config::{ConfigError, EngineConfig, FORCE_TIER_ENV, SHA_EXT_ENV},
    engine::Engine,
    engine_test_suite,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

engine_test_suite! {
    mod cpu_ref_sse,
    backend = mbcrypt_backend::CpuRef,
    caps = mbcrypt_backend::Capabilities::new(mbcrypt_backend::CapabilityTier::Sse, false),
    tests = {
        test_manager_out_of_order => crate::test_suite::test_manager_out_of_order,
        test_manager_full_submit_runs_one_round => crate::test_suite::test_manager_full_submit_runs_one_round,
        test_manager_idle_flush => crate::test_suite::test_manager_idle_flush,
        test_manager_width_one_is_synchronous => crate::test_suite::test_manager_width_one_is_synchronous,
        test_manager_lane_hygiene => crate::test_suite::test_manager_lane_hygiene,
        test_engine_completeness => crate::test_suite::test_engine_completeness,
        test_engine_progress => crate::test_suite::test_engine_progress,
        test_engine_width_bound => crate::test_suite::test_engine_width_bound,
        test_engine_idle_flush => crate::test_suite::test_engine_idle_flush,
        test_engine_validation => crate::test_suite::test_engine_validation,
        test_engine_degraded => crate::test_suite::test_engine_degraded,
        test_engine_zero_length_hash => crate::test_suite::test_engine_zero_length_hash,
        test_engine_burst => crate::test_suite::test_engine_burst,
        test_engine_queue_size => crate::test_suite::test_engine_queue_size,
        test_engine_aead => crate::test_suite::test_engine_aead,
        test_engine_flush_order => crate::test_suite::test_engine_flush_order,
        test_engine_resubmit => crate::test_suite::test_engine_resubmit,
        test_engine_class_bursts => crate::test_suite::test_engine_class_bursts,
        test_engine_submit_nocheck => crate::test_suite::test_engine_submit_nocheck,
    }
}

engine_test_suite! {
    mod cpu_ref_gfni_sha_ext,
    backend = mbcrypt_backend::CpuRef,
    caps = mbcrypt_backend::Capabilities::new(mbcrypt_backend::CapabilityTier::SseGfni, true),
    tests = {
        test_engine_completeness => crate::test_suite::test_engine_completeness,
        test_engine_progress => crate::test_suite::test_engine_progress,
        test_engine_width_bound => crate::test_suite::test_engine_width_bound,
        test_engine_burst => crate::test_suite::test_engine_burst,
        test_engine_queue_size => crate::test_suite::test_engine_queue_size,
        test_engine_flush_order => crate::test_suite::test_engine_flush_order,
        test_engine_resubmit => crate::test_suite::test_engine_resubmit,
    }
}

engine_test_suite! {
    mod cpu_ref_scalar,
    backend = mbcrypt_backend::CpuRef,
    caps = mbcrypt_backend::Capabilities::new(mbcrypt_backend::CapabilityTier::Scalar, false),
    tests = {
        test_engine_completeness => crate::test_suite::test_engine_completeness,
        test_engine_validation => crate::test_suite::test_engine_validation,
        test_engine_idle_flush => crate::test_suite::test_engine_idle_flush,
        test_engine_aead => crate::test_suite::test_engine_aead,
        test_engine_resubmit => crate::test_suite::test_engine_resubmit,
        test_engine_class_bursts => crate::test_suite::test_engine_class_bursts,
    }
}

fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn config_defaults_when_unset() {
    assert_eq!(EngineConfig::from_lookup(lookup(&[])), Ok(EngineConfig::default()));
    assert_eq!(
        EngineConfig::from_lookup(lookup(&[(FORCE_TIER_ENV, " "), (SHA_EXT_ENV, "")])),
        Ok(EngineConfig::default())
    );
}

#[test]
fn config_parses_overrides() {
    let config: EngineConfig = EngineConfig::from_lookup(lookup(&[(FORCE_TIER_ENV, "SSE"), (SHA_EXT_ENV, "false")])).unwrap();
    assert_eq!(config.force_tier, Some(CapabilityTier::Sse));
    assert_eq!(config.sha_ext, Some(false));
}

#[test]
fn config_rejects_garbage() {
    assert_eq!(
        EngineConfig::from_lookup(lookup(&[(FORCE_TIER_ENV, "avx512")])),
        Err(ConfigError::UnknownTier {
            var: FORCE_TIER_ENV,
            value: "avx512".to_string()
        })
    );
    assert!(matches!(
        EngineConfig::from_lookup(lookup(&[(SHA_EXT_ENV, "yes")])),
        Err(ConfigError::InvalidBool { .. })
    ));
}

#[test]
fn config_only_lowers_capabilities() {
    init_logger();
    let detected: Capabilities = Capabilities::new(CapabilityTier::Sse, false);

    let lower: EngineConfig = EngineConfig {
        force_tier: Some(CapabilityTier::Scalar),
        sha_ext: None,
    };
    assert_eq!(lower.resolve(detected).tier, CapabilityTier::Scalar);

    let higher: EngineConfig = EngineConfig {
        force_tier: Some(CapabilityTier::SseGfni),
        sha_ext: Some(true),
    };
    assert_eq!(higher.resolve(detected), detected);

    let no_sha: EngineConfig = EngineConfig {
        force_tier: None,
        sha_ext: Some(false),
    };
    assert!(!no_sha.resolve(Capabilities::new(CapabilityTier::SseGfni, true)).sha_ext);
}

#[test]
fn forced_scalar_engine_is_degraded() {
    init_logger();
    let config: EngineConfig = EngineConfig {
        force_tier: Some(CapabilityTier::Scalar),
        sha_ext: None,
    };
    let engine: Engine<CpuRef> = Engine::with_config(&config);
    assert!(engine.is_degraded());
    assert_eq!(engine.lane_width(LaneFamily::Aes128CbcEnc), 1);
}

#[test]
fn detected_engine_is_consistent() {
    init_logger();
    let engine: Engine<CpuRef> = Engine::new();
    let caps: Capabilities = engine.capabilities();
    LaneFamily::ALL
        .iter()
        .for_each(|family| assert_eq!(engine.lane_width(*family), caps.lane_width(*family)));
}
