use scoutlink::test_support::{team_fixture, team_id, TestUpstreams};
use scoutlink::{Error, Field, Program};

#[tokio::test]
async fn team_lookup_reconciles_all_three_sources() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();

    let mut indexed = team_fixture(Program::Frc, 118);
    indexed.name_short = Field::Value("Team 118".to_string());
    indexed.city = Field::Value("Houston".to_string());
    indexed.rookie_year = Field::Null;
    upstreams.team_index.push(indexed);

    let mut partner = team_fixture(Program::Frc, 118);
    partner.name_short = Field::Value("Robonauts".to_string());
    partner.rookie_year = Field::Value(1997);
    partner.website = Field::Null;
    upstreams.team_partner_a.push(partner);

    let mut local = team_fixture(Program::Frc, 118);
    local.name_short = Field::Null;
    local.city = Field::Value("League City".to_string());
    upstreams.team_local.push(local);

    let scoutlink = upstreams.scoutlink();
    let team = scoutlink.teams().get(&team_id(Program::Frc, 118)).await?;

    // Partner beats index; the local null falls back to the partner value.
    assert_eq!(team.name_short, Field::Value("Robonauts".to_string()));
    // Local override beats everything below it.
    assert_eq!(team.city, Field::Value("League City".to_string()));
    // Index null is repaired by the partner value.
    assert_eq!(team.rookie_year, Field::Value(1997));
    // Null with nothing underneath stays null.
    assert_eq!(team.website, Field::Null);
    // Nobody reported the field at all.
    assert_eq!(team.robot_name, Field::Absent);

    Ok(())
}

#[tokio::test]
async fn secondary_failures_degrade_to_absent_fields() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();

    let mut indexed = team_fixture(Program::Frc, 254);
    indexed.name_short = Field::Value("The Cheesy Poofs".to_string());
    upstreams.team_index.push(indexed);

    let mut partner = team_fixture(Program::Frc, 254);
    partner.rookie_year = Field::Value(1999);
    upstreams.team_partner_a.push(partner);

    upstreams.team_partner_a.set_fail_budget(10);
    upstreams.team_local.set_fail_budget(10);

    let scoutlink = upstreams.scoutlink();
    let team = scoutlink.teams().get(&team_id(Program::Frc, 254)).await?;

    assert_eq!(team.name_short, Field::Value("The Cheesy Poofs".to_string()));
    assert_eq!(team.rookie_year, Field::Absent);

    Ok(())
}

#[tokio::test]
async fn primary_failure_surfaces_after_retries() {
    let upstreams = TestUpstreams::new();
    upstreams.team_index.push(team_fixture(Program::Frc, 971));
    upstreams.team_index.set_fail_budget(2);

    let scoutlink = upstreams.scoutlink();
    let err = scoutlink
        .teams()
        .get(&team_id(Program::Frc, 971))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UpstreamUnavailable {
            upstream: "search-index",
            ..
        }
    ));
    // One initial attempt plus the single configured retry.
    assert_eq!(upstreams.team_index.calls(), 2);
}

#[tokio::test]
async fn primary_retry_recovers_from_a_transient_failure() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    upstreams.team_index.push(team_fixture(Program::Ftc, 7236));
    upstreams.team_index.set_fail_budget(1);

    let scoutlink = upstreams.scoutlink();
    let team = scoutlink.teams().get(&team_id(Program::Ftc, 7236)).await?;

    assert_eq!(team.number, 7236);
    assert_eq!(upstreams.team_index.calls(), 2);

    Ok(())
}

#[tokio::test]
async fn record_absent_everywhere_is_not_found() {
    let upstreams = TestUpstreams::new();
    let scoutlink = upstreams.scoutlink();

    let err = scoutlink
        .teams()
        .get(&team_id(Program::Frc, 9999))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn local_only_record_still_resolves() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();

    let mut local = team_fixture(Program::Fll, 4042);
    local.name_short = Field::Value("Curbside Pickup".to_string());
    upstreams.team_local.push(local);

    let scoutlink = upstreams.scoutlink();
    let team = scoutlink.teams().get(&team_id(Program::Fll, 4042)).await?;

    assert_eq!(team.name_short, Field::Value("Curbside Pickup".to_string()));

    Ok(())
}

#[tokio::test]
async fn repeated_lookup_is_served_from_cache() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    upstreams.team_index.push(team_fixture(Program::Frc, 1678));

    let scoutlink = upstreams.scoutlink();
    let id = team_id(Program::Frc, 1678);

    scoutlink.teams().get(&id).await?;
    let index_calls = upstreams.team_index.calls();
    let local_calls = upstreams.team_local.calls();

    scoutlink.teams().get(&id).await?;
    assert_eq!(upstreams.team_index.calls(), index_calls);
    assert_eq!(upstreams.team_local.calls(), local_calls);

    Ok(())
}
