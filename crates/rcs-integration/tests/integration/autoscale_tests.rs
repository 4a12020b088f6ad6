//! Auto Scale scenarios

use rcs_domain::error::Result;
use rcs_domain::pagination::PageRequest;
use rcs_domain::value_objects::{
    GroupConfiguration, LaunchConfiguration, PolicyAdjustment, PolicyConfiguration, ScalingGroup,
    ScalingGroupConfiguration, WebhookConfiguration,
};
use rcs_integration::TestHarness;

const IMAGE: &str = "3afe97b2-26dc-49c5-a2cc-a2fc8d80c001";
const FLAVOR: &str = "performance1-1";

fn group_config(h: &TestHarness, min: u32) -> ScalingGroupConfiguration {
    let name = h.unique_name("group");
    ScalingGroupConfiguration {
        group_configuration: GroupConfiguration::new(&name, 60, min, Some(3)),
        launch_configuration: LaunchConfiguration::server(format!("{name}-node"), IMAGE, FLAVOR),
        scaling_policies: vec![PolicyConfiguration::webhook(
            "scale up",
            60,
            PolicyAdjustment::Change(1),
        )],
    }
}

async fn create_group(h: &TestHarness) -> Result<ScalingGroup> {
    h.autoscale().create_group(&group_config(h, 0)).await
}

async fn group_lifecycle(h: &TestHarness) -> Result<()> {
    let config = group_config(h, 0);
    let group = h.autoscale().create_group(&config).await?;
    assert_eq!(group.scaling_policies.len(), 1);

    let fetched = h.autoscale().get_group(&group.id).await?;
    let fetched_config = fetched.group_configuration.unwrap();
    assert_eq!(fetched_config.name, config.group_configuration.name);
    assert_eq!(fetched_config.max_entities, Some(3));

    let state = h.autoscale().get_group_state(&group.id).await?;
    assert!(!state.paused);
    assert_eq!(state.desired_capacity, 0);

    let listed = h.autoscale().list_all_scaling_groups().await?;
    assert!(listed.iter().any(|g| g.id == group.id));

    h.autoscale().delete_group(&group.id, false).await?;
    let err = h.autoscale().get_group(&group.id).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

async fn invalid_group_rejected(h: &TestHarness) -> Result<()> {
    let mut config = group_config(h, 0);
    config.group_configuration.min_entities = 5;
    let err = h.autoscale().create_group(&config).await.unwrap_err();
    assert!(err.to_string().contains("minEntities"));
    Ok(())
}

async fn group_configuration_update(h: &TestHarness) -> Result<()> {
    let group = create_group(h).await?;
    let mut config = h.autoscale().get_group_configuration(&group.id).await?;
    config.cooldown = 120;
    config.max_entities = Some(2);
    config
        .metadata
        .insert("owner".to_string(), "integration".to_string());
    h.autoscale().set_group_configuration(&group.id, &config).await?;

    let updated = h.autoscale().get_group_configuration(&group.id).await?;
    assert_eq!(updated.cooldown, 120);
    assert_eq!(updated.max_entities, Some(2));
    assert_eq!(updated.metadata.get("owner").map(String::as_str), Some("integration"));
    Ok(())
}

async fn launch_configuration_update(h: &TestHarness) -> Result<()> {
    let group = create_group(h).await?;
    let launch = LaunchConfiguration::server(h.unique_name("node"), IMAGE, "performance1-2");
    h.autoscale().set_launch_configuration(&group.id, &launch).await?;

    let fetched = h.autoscale().get_launch_configuration(&group.id).await?;
    assert_eq!(fetched.server_argument().flavor_ref, "performance1-2");
    assert_eq!(fetched.server_argument().image_ref, IMAGE);
    Ok(())
}

async fn policy_lifecycle(h: &TestHarness) -> Result<()> {
    let group = create_group(h).await?;

    let percent = PolicyConfiguration::webhook("grow", 30, PolicyAdjustment::ChangePercent(50.0));
    let policy = h.autoscale().create_policy(&group.id, &percent).await?;
    let schedule = PolicyConfiguration::cron(
        "nightly",
        0,
        PolicyAdjustment::DesiredCapacity(0),
        "0 2 * * *",
    );
    let nightly = h.autoscale().create_policy(&group.id, &schedule).await?;

    let policies = h.autoscale().list_all_policies(&group.id).await?;
    assert_eq!(policies.len(), 3);
    let fetched = h.autoscale().get_policy(&group.id, &nightly.id).await?;
    assert_eq!(
        fetched.configuration.args.and_then(|args| args.cron).as_deref(),
        Some("0 2 * * *")
    );

    let mut changed = policy.configuration.clone();
    changed.set_adjustment(PolicyAdjustment::Change(-1));
    h.autoscale().set_policy(&group.id, &policy.id, &changed).await?;
    let fetched = h.autoscale().get_policy(&group.id, &policy.id).await?;
    assert_eq!(
        fetched.configuration.adjustment(),
        Some(PolicyAdjustment::Change(-1))
    );

    let mut invalid = changed;
    invalid.change_percent = Some(10.0);
    let err = h
        .autoscale()
        .create_policy(&group.id, &invalid)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("exactly one"));

    h.autoscale().delete_policy(&group.id, &nightly.id).await?;
    let err = h
        .autoscale()
        .get_policy(&group.id, &nightly.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

// launches real servers against the cloud, so capacity is only asserted in memory
async fn policy_execution(h: &TestHarness) -> Result<()> {
    if h.is_live() {
        return Ok(());
    }
    let group = h.autoscale().create_group(&group_config(h, 1)).await?;
    assert_eq!(h.autoscale().get_group_state(&group.id).await?.active_capacity, 1);

    let up = &group.scaling_policies[0];
    h.autoscale().execute_policy(&group.id, &up.id).await?;
    assert_eq!(h.autoscale().get_group_state(&group.id).await?.desired_capacity, 2);

    let burst = PolicyConfiguration::webhook("burst", 0, PolicyAdjustment::Change(10));
    let burst = h.autoscale().create_policy(&group.id, &burst).await?;
    h.autoscale().execute_policy(&group.id, &burst.id).await?;
    let state = h.autoscale().get_group_state(&group.id).await?;
    assert_eq!(state.desired_capacity, 3);
    assert_eq!(state.active.len(), 3);

    let err = h.autoscale().delete_group(&group.id, false).await.unwrap_err();
    assert!(err.is_conflict());
    h.autoscale().delete_group(&group.id, true).await?;
    Ok(())
}

async fn pause_and_resume(h: &TestHarness) -> Result<()> {
    let group = create_group(h).await?;
    h.autoscale().pause_group(&group.id).await?;
    assert!(h.autoscale().get_group_state(&group.id).await?.paused);

    if !h.is_live() {
        let up = &group.scaling_policies[0];
        let err = h
            .autoscale()
            .execute_policy(&group.id, &up.id)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    h.autoscale().resume_group(&group.id).await?;
    assert!(!h.autoscale().get_group_state(&group.id).await?.paused);
    Ok(())
}

async fn webhook_lifecycle(h: &TestHarness) -> Result<()> {
    let group = create_group(h).await?;
    let policy = &group.scaling_policies[0];

    let hook = h
        .autoscale()
        .create_webhook(&group.id, &policy.id, &WebhookConfiguration::new("deploy hook"))
        .await?;
    assert!(hook.capability_url().is_some());

    let mut renamed = WebhookConfiguration::new("release hook");
    renamed
        .metadata
        .insert("source".to_string(), "ci".to_string());
    h.autoscale()
        .update_webhook(&group.id, &policy.id, &hook.id, &renamed)
        .await?;
    let fetched = h
        .autoscale()
        .get_webhook(&group.id, &policy.id, &hook.id)
        .await?;
    assert_eq!(fetched.configuration, renamed);

    let hooks = h.autoscale().list_all_webhooks(&group.id, &policy.id).await?;
    assert_eq!(hooks.len(), 1);

    h.autoscale()
        .delete_webhook(&group.id, &policy.id, &hook.id)
        .await?;
    assert!(
        h.autoscale()
            .list_all_webhooks(&group.id, &policy.id)
            .await?
            .is_empty()
    );
    Ok(())
}

async fn group_pagination(h: &TestHarness) -> Result<()> {
    let mut created = Vec::new();
    for _ in 0..3 {
        created.push(create_group(h).await?.id);
    }

    let first = h
        .autoscale()
        .list_scaling_groups(PageRequest::first(Some(2)))
        .await?;
    assert_eq!(first.len(), 2);
    let marker = first.next_marker().map(str::to_string).unwrap();
    let second = h
        .autoscale()
        .list_scaling_groups(PageRequest::first(Some(2)).after(marker))
        .await?;
    assert!(second.items().iter().all(|g| !first.items().contains(g)));

    let all = h.autoscale().list_all_scaling_groups().await?;
    for id in &created {
        assert!(all.iter().any(|g| &g.id == id));
    }
    Ok(())
}

rcs_integration::scenarios!(
    group_lifecycle,
    invalid_group_rejected,
    group_configuration_update,
    launch_configuration_update,
    policy_lifecycle,
    policy_execution,
    pause_and_resume,
    webhook_lifecycle,
    group_pagination,
);
