use std::time::Duration;

use crate::flags::{FlagName, FlagOverrides};
use crate::test::doubles::{DataSourceCall, RecordingDataSource, RecordingForceSvg};
use crate::test::{Fixture, eventually, settle};
use crate::{FeatureFlags, FlagEvent};

const LOAD_TIMEOUT: Option<Duration> = Some(Duration::from_secs(2));

#[tokio::test]
async fn loads_flags_from_the_data_source_once() {
    let fixture = Fixture::new(
        RecordingDataSource::new(FlagOverrides {
            enabled_experimental_plugins: Some(vec!["foo".into(), "bar".into()]),
            in_hosted_notebook: Some(false),
            ..Default::default()
        }),
        RecordingForceSvg::default(),
    );

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    assert_eq!(fixture.source.fetch_count(), 1);
    assert_eq!(
        fixture.handle.loaded_flags().await.unwrap(),
        FlagOverrides {
            enabled_experimental_plugins: Some(vec!["foo".into(), "bar".into()]),
            in_hosted_notebook: Some(false),
            force_svg: Some(false),
            ..Default::default()
        }
    );

    // Exactly one partial-load event reaches the widget.
    let widget = fixture.widget.clone();
    assert!(eventually(|| widget.calls().len() == 1).await);
    settle().await;
    assert_eq!(fixture.widget.calls().len(), 1);

    fixture.shutdown().await;
}

#[tokio::test]
async fn enriches_the_partial_load_from_the_force_svg_source() {
    let fixture = Fixture::new(
        RecordingDataSource::new(FlagOverrides {
            in_hosted_notebook: Some(true),
            ..Default::default()
        }),
        RecordingForceSvg::new(true),
    );

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    let loaded = fixture.handle.loaded_flags().await.unwrap();
    assert_eq!(loaded.force_svg, Some(true));
    assert!(fixture.handle.flags().await.unwrap().force_svg);

    assert_eq!(fixture.force_svg.get_count(), 1);
    assert!(fixture.force_svg.sets().is_empty());

    fixture.shutdown().await;
}

#[tokio::test]
async fn pushes_a_fetched_force_svg_value_into_the_dedicated_source() {
    let fixture = Fixture::new(
        RecordingDataSource::new(FlagOverrides {
            force_svg: Some(true),
            ..Default::default()
        }),
        RecordingForceSvg::default(),
    );

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    assert_eq!(
        fixture.handle.loaded_flags().await.unwrap().force_svg,
        Some(true)
    );

    assert_eq!(fixture.force_svg.sets(), vec![true]);
    assert_eq!(fixture.force_svg.get_count(), 0);

    fixture.shutdown().await;
}

#[tokio::test]
async fn a_failed_fetch_still_emits_one_partial_load() {
    let fixture = Fixture::new(RecordingDataSource::failing(), RecordingForceSvg::default());

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    assert_eq!(
        fixture.handle.loaded_flags().await.unwrap(),
        FlagOverrides {
            force_svg: Some(false),
            ..Default::default()
        }
    );
    assert_eq!(
        fixture.handle.flags().await.unwrap(),
        FeatureFlags::default()
    );

    fixture.shutdown().await;
}

#[tokio::test]
async fn the_widget_receives_store_resolved_values_not_the_event_payload() {
    let fixture = Fixture::new(RecordingDataSource::default(), RecordingForceSvg::default());

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    fixture
        .handle
        .override_flags(FlagOverrides {
            in_hosted_notebook: Some(true),
            scalars_batch_size: Some(10),
            ..Default::default()
        })
        .await;

    // A stale partial load arrives after the override; the widget must see
    // the override, not the payload.
    fixture
        .handle
        .dispatch(FlagEvent::PartialFlagsLoaded {
            flags: FlagOverrides {
                in_hosted_notebook: Some(false),
                ..Default::default()
            },
        })
        .await;

    let widget = fixture.widget.clone();
    assert!(eventually(|| widget.calls().len() == 2).await);

    let (flags, server_flags) = fixture.widget.calls().pop().unwrap();
    assert!(flags.in_hosted_notebook);
    assert_eq!(
        server_flags,
        FlagOverrides {
            scalars_batch_size: Some(10),
            ..Default::default()
        }
    );

    fixture.shutdown().await;
}

#[tokio::test]
async fn persists_an_override_change_exactly_once() {
    let fixture = Fixture::new(RecordingDataSource::default(), RecordingForceSvg::default());

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    let overrides = FlagOverrides {
        allow_auto_dark_mode: Some(false),
        ..Default::default()
    };
    fixture.handle.override_flags(overrides.clone()).await;

    let source = fixture.source.clone();
    let expected = DataSourceCall::Persist(overrides);
    assert!(eventually(|| source.calls().contains(&expected)).await);
    settle().await;
    assert_eq!(fixture.source.calls(), vec![expected]);

    fixture.shutdown().await;
}

#[tokio::test]
async fn resets_each_named_override_once() {
    let fixture = Fixture::new(RecordingDataSource::default(), RecordingForceSvg::default());

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    fixture
        .handle
        .reset_overrides(vec![FlagName::InHostedNotebook, FlagName::ForceSvg])
        .await;

    let source = fixture.source.clone();
    assert!(eventually(|| source.calls().len() == 2).await);
    settle().await;
    assert_eq!(
        fixture.source.calls(),
        vec![
            DataSourceCall::Reset(FlagName::InHostedNotebook),
            DataSourceCall::Reset(FlagName::ForceSvg),
        ]
    );

    fixture.shutdown().await;
}

#[tokio::test]
async fn resets_all_overrides_exactly_once() {
    let fixture = Fixture::new(RecordingDataSource::default(), RecordingForceSvg::default());

    fixture.handle.wait_for_load(LOAD_TIMEOUT).await.unwrap();

    fixture
        .handle
        .override_flags(FlagOverrides {
            force_svg: Some(true),
            ..Default::default()
        })
        .await;
    fixture.handle.reset_all_overrides().await;

    let source = fixture.source.clone();
    assert!(eventually(|| source.calls().contains(&DataSourceCall::ResetAll)).await);
    settle().await;
    assert_eq!(
        fixture
            .source
            .calls()
            .iter()
            .filter(|call| **call == DataSourceCall::ResetAll)
            .count(),
        1
    );

    assert_eq!(
        fixture.handle.overridden_flags().await.unwrap(),
        FlagOverrides::default()
    );

    fixture.shutdown().await;
}
