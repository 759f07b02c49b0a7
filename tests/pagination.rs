use scoutlink::filter::TeamFilter;
use scoutlink::test_support::{team_fixture, TestUpstreams};
use scoutlink::{AggregatorConfig, Cursor, Error, Field, Program};

fn seed_teams(upstreams: &TestUpstreams, numbers: &[u32]) {
    upstreams
        .team_index
        .extend(numbers.iter().map(|&n| team_fixture(Program::Frc, n)));
}

fn numbers(connection: &scoutlink::Connection<scoutlink::Team>) -> Vec<u32> {
    connection.edges.iter().map(|edge| edge.node.number).collect()
}

#[tokio::test]
async fn short_result_fits_in_one_page() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1, 2, 3]);

    let scoutlink = upstreams.scoutlink();
    let page = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], Some(5), None)
        .await?;

    assert_eq!(numbers(&page), vec![1, 2, 3]);
    assert!(!page.page_info.has_next_page);
    assert!(!page.page_info.has_previous_page);
    assert_eq!(page.total_count, 3);

    Ok(())
}

#[tokio::test]
async fn probe_row_signals_more_data() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1, 2, 3, 4, 5]);

    let scoutlink = upstreams.scoutlink();
    let page = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], Some(2), None)
        .await?;

    assert_eq!(numbers(&page), vec![1, 2]);
    assert!(page.page_info.has_next_page);
    assert_eq!(page.total_count, 5);

    Ok(())
}

#[tokio::test]
async fn cursor_walk_visits_every_row_once() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1, 2, 3, 4, 5]);

    let scoutlink = upstreams.scoutlink();
    let filter = TeamFilter::default();

    let first = scoutlink.teams().list(&filter, &[], Some(2), None).await?;
    assert_eq!(numbers(&first), vec![1, 2]);

    let second = scoutlink
        .teams()
        .list(&filter, &[], Some(2), first.page_info.end_cursor.as_deref())
        .await?;
    assert_eq!(numbers(&second), vec![3, 4]);
    assert!(second.page_info.has_next_page);
    assert!(second.page_info.has_previous_page);

    let third = scoutlink
        .teams()
        .list(&filter, &[], Some(2), second.page_info.end_cursor.as_deref())
        .await?;
    assert_eq!(numbers(&third), vec![5]);
    assert!(!third.page_info.has_next_page);
    assert!(third.page_info.has_previous_page);

    // Positions are absolute across the walk.
    let last = Cursor::decode(&third.edges[0].cursor)?;
    assert_eq!(last.position, 4);

    Ok(())
}

#[tokio::test]
async fn identical_queries_mint_identical_cursors() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[10, 20, 30]);

    let scoutlink = upstreams.scoutlink();
    let filter = TeamFilter::default();

    let left = scoutlink.teams().list(&filter, &[], Some(2), None).await?;
    let right = scoutlink.teams().list(&filter, &[], Some(2), None).await?;

    assert_eq!(left.page_info.end_cursor, right.page_info.end_cursor);
    assert_eq!(left.edges[0].cursor, right.edges[0].cursor);

    Ok(())
}

#[tokio::test]
async fn requested_page_size_is_clamped() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1, 2, 3, 4]);

    let mut config = AggregatorConfig::default();
    config.paging.max_page_size = 2;
    let scoutlink = upstreams.scoutlink_with(&config);

    let page = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], Some(50), None)
        .await?;

    assert_eq!(page.edges.len(), 2);
    assert!(page.page_info.has_next_page);

    Ok(())
}

#[tokio::test]
async fn omitted_page_size_uses_the_configured_default() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1, 2, 3, 4, 5]);

    let mut config = AggregatorConfig::default();
    config.paging.default_page_size = 3;
    let scoutlink = upstreams.scoutlink_with(&config);

    let page = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], None, None)
        .await?;

    assert_eq!(numbers(&page), vec![1, 2, 3]);
    assert!(page.page_info.has_next_page);

    Ok(())
}

#[tokio::test]
async fn list_amends_hits_from_the_local_store() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1, 2, 3]);

    let mut overridden = team_fixture(Program::Frc, 2);
    overridden.name_short = Field::Value("Renamed".to_string());
    upstreams.team_local.push(overridden);
    // A record living only in the override store never joins a listing.
    upstreams.team_local.push(team_fixture(Program::Frc, 99));

    let scoutlink = upstreams.scoutlink();
    let page = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], Some(10), None)
        .await?;

    assert_eq!(numbers(&page), vec![1, 2, 3]);
    assert_eq!(
        page.edges[1].node.name_short,
        Field::Value("Renamed".to_string())
    );
    assert_eq!(page.edges[0].node.name_short, Field::Absent);
    // Partner feeds are by-id enrichment only.
    assert_eq!(upstreams.team_partner_a.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn override_store_failure_degrades_listing() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[7, 8]);
    upstreams.team_local.set_fail_budget(10);

    let scoutlink = upstreams.scoutlink();
    let page = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], Some(5), None)
        .await?;

    assert_eq!(numbers(&page), vec![7, 8]);

    Ok(())
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1]);

    let scoutlink = upstreams.scoutlink();
    let err = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], Some(5), Some("not a cursor"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidIdentifier { .. }));
}

#[tokio::test]
async fn entity_id_passed_as_cursor_is_rejected() {
    let upstreams = TestUpstreams::new();
    seed_teams(&upstreams, &[1]);

    let scoutlink = upstreams.scoutlink();
    let id = scoutlink::test_support::team_id(Program::Frc, 1);
    let err = scoutlink
        .teams()
        .list(&TeamFilter::default(), &[], Some(5), Some(id.as_str()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidIdentifier { .. }));
}
