use std::str::FromStr;

use capi_conversion::{
    ConversionError, ConverterError, ConverterPair, Driver, Leg, RegistryBuilder,
    UnknownVersionError,
};
use capi_version::SchemaVersion;
use control_plane::{
    KubeadmControlPlane, V1ALPHA3, V1ALPHA4, V1BETA1, v1alpha3_full, v1alpha4, v1alpha4_full,
};
use insta::assert_snapshot;


/// A driver whose converters must never run.
fn untouchable_driver() -> Driver<KubeadmControlPlane> {
    RegistryBuilder::new(V1ALPHA4)
        .with(
            V1ALPHA3,
            ConverterPair::new(
                V1ALPHA4,
                |_: KubeadmControlPlane| unreachable!("to_hub must not be called"),
                |_: KubeadmControlPlane| unreachable!("from_hub must not be called"),
            ),
        )
        .expect("v1alpha3 is a valid spoke")
        .build()
        .into()
}

#[test]
fn same_version_runs_no_converter() {
    let original = KubeadmControlPlane::V1Alpha3(v1alpha3_full());

    let converted = untouchable_driver()
        .convert(original.clone(), &V1ALPHA3, &V1ALPHA3)
        .expect("same version conversion succeeds");

    assert_eq!(converted, original);
}

#[test]
fn unknown_target_runs_no_converter() {
    let v9 = SchemaVersion::from_str("v9").expect("valid schema version");

    let err = untouchable_driver()
        .convert_to(KubeadmControlPlane::V1Alpha3(v1alpha3_full()), &v9)
        .expect_err("v9 is not registered");

    assert!(matches!(
        err,
        ConversionError::UnknownVersion {
            source: UnknownVersionError { version, hub }
        } if version == v9 && hub == V1ALPHA4
    ));
}

#[test]
fn unknown_source_runs_no_converter() {
    // The registry of the untouchable driver doesn't know v1beta1
    let err = untouchable_driver()
        .convert_to(KubeadmControlPlane::V1Beta1(Default::default()), &V1ALPHA3)
        .expect_err("v1beta1 is not registered");

    assert!(matches!(
        err,
        ConversionError::UnknownVersion {
            source: UnknownVersionError { version: V1BETA1, .. }
        }
    ));
}

#[test]
fn validate_keeps_rejected_resource() {
    let v9 = SchemaVersion::from_str("v9").expect("valid schema version");
    let driver = untouchable_driver();
    let resource = KubeadmControlPlane::V1Alpha3(v1alpha3_full());

    let err = driver
        .validate(&resource, &V1ALPHA3, &v9)
        .expect_err("v9 is not registered");
    assert!(matches!(err, ConversionError::UnknownVersion { .. }));

    let err = driver
        .validate(&resource, &V1ALPHA4, &V1ALPHA3)
        .expect_err("the resource is tagged v1alpha3");
    assert!(matches!(
        err,
        ConversionError::SourceVersionMismatch {
            expected: V1ALPHA4,
            actual: V1ALPHA3,
        }
    ));

    // Still owned by the caller, so it can be handed back unchanged
    assert_eq!(resource, KubeadmControlPlane::V1Alpha3(v1alpha3_full()));
    driver
        .validate(&resource, &V1ALPHA3, &V1ALPHA3)
        .expect("same version passes");
}

#[test]
fn failing_to_hub_leg() {
    let mut kcp = v1alpha3_full();
    kcp.spec.version = "latest".to_owned();

    let err = control_plane::driver()
        .convert_to(KubeadmControlPlane::V1Alpha3(kcp), &V1BETA1)
        .expect_err("\"latest\" is not a Kubernetes version");

    assert_snapshot!(
        err.to_string(),
        @"failed to convert from v1alpha3 to v1beta1 on the to-hub leg"
    );

    let (field, value, from, to, leg) = match err {
        ConversionError::ConversionFailed {
            source: ConverterError::InvalidField { field, value, .. },
            from,
            to,
            leg,
        } => (field, value, from, to, leg),
        other => panic!("expected an invalid field, got {other:?}"),
    };
    assert_eq!(field, "spec.version");
    assert_eq!(value, "latest");
    assert_eq!((from, to, leg), (V1ALPHA3, V1BETA1, Leg::ToHub));
}

#[test]
fn failing_from_hub_leg() {
    let mut kcp = v1alpha4_full();
    kcp.spec.machine_template.node_drain_timeout = Some("2m".to_owned());

    let err = control_plane::driver()
        .convert_to(KubeadmControlPlane::V1Alpha4(kcp), &V1BETA1)
        .expect_err("minutes cannot be represented in v1beta1");

    assert!(matches!(
        err,
        ConversionError::ConversionFailed {
            source: ConverterError::InvalidField { .. },
            from: V1ALPHA4,
            to: V1BETA1,
            leg: Leg::FromHub,
        }
    ));
}

#[test]
fn missing_required_field() {
    // v1beta1 requires the surge, the hub doesn't
    let mut kcp = v1alpha4_full();
    kcp.spec.rollout_strategy = Some(v1alpha4::RolloutStrategy { max_surge: None });

    let err = control_plane::driver()
        .convert_to(KubeadmControlPlane::V1Alpha4(kcp), &V1BETA1)
        .expect_err("v1beta1 has no default for the surge");

    assert!(matches!(
        err,
        ConversionError::ConversionFailed {
            source: ConverterError::MissingField { ref field },
            from: V1ALPHA4,
            to: V1BETA1,
            leg: Leg::FromHub,
        } if field == "spec.rolloutStrategy.maxSurge"
    ));
    assert_snapshot!(
        err.to_string(),
        @"failed to convert from v1alpha4 to v1beta1 on the from-hub leg"
    );
}

#[test]
fn failing_second_hop_returns_no_partial_result() {
    // The first hop (v1alpha3 to the hub) succeeds, the second one fails
    let mut kcp = v1alpha3_full();
    kcp.metadata.annotations.insert(
        capi_conversion::preserve::CONVERSION_DATA_ANNOTATION.to_owned(),
        r#"{"nodeDrainTimeout":"1h"}"#.to_owned(),
    );

    let err = control_plane::driver()
        .convert_to(KubeadmControlPlane::V1Alpha3(kcp), &V1BETA1)
        .expect_err("hours cannot be represented in v1beta1");

    assert!(matches!(
        err,
        ConversionError::ConversionFailed {
            leg: Leg::FromHub,
            ..
        }
    ));
}

#[test]
fn malformed_preserved_data() {
    let mut kcp = v1alpha3_full();
    kcp.metadata.annotations.insert(
        capi_conversion::preserve::CONVERSION_DATA_ANNOTATION.to_owned(),
        "{".to_owned(),
    );

    let err = control_plane::driver()
        .convert_to(KubeadmControlPlane::V1Alpha3(kcp), &V1ALPHA4)
        .expect_err("preserved data is not valid JSON");

    assert!(matches!(
        err,
        ConversionError::ConversionFailed {
            source: ConverterError::DeserializePreservedData { .. },
            leg: Leg::ToHub,
            ..
        }
    ));
}

#[test]
fn spoke_to_spoke_takes_two_hops() {
    let converted = control_plane::driver()
        .convert_to(KubeadmControlPlane::V1Alpha3(v1alpha3_full()), &V1BETA1)
        .expect("v1alpha3 converts to v1beta1");

    let kcp = match converted {
        KubeadmControlPlane::V1Beta1(kcp) => kcp,
        other => panic!("expected a v1beta1 control plane, got {other:?}"),
    };
    assert_eq!(kcp.spec.version, "v1.21.2");
    assert_eq!(
        kcp.spec.machine_template.infrastructure_ref,
        "capi-quickstart-control-plane-docker"
    );
    assert_eq!(kcp.spec.machine_template.node_drain_timeout_seconds, None);
    assert_eq!(kcp.status.conditions.len(), 2);
}

#[test]
fn registry_lists_all_versions() {
    let driver = control_plane::driver();

    assert_eq!(driver.registry().versions(), vec![V1ALPHA3, V1ALPHA4, V1BETA1]);
    assert_eq!(driver.registry().hub(), &V1ALPHA4);
}
