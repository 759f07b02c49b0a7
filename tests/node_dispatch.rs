use uuid::Uuid;

use scoutlink::model::{MatchLevel, RoleKey};
use scoutlink::test_support::{
    event_fixture, event_id, match_fixture, match_id, team_fixture, team_id, TestUpstreams,
};
use scoutlink::{encode_id, Error, Field, Node, OpaqueId, Program};

#[tokio::test]
async fn team_id_dispatches_to_the_team_repository() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    upstreams.team_index.push(team_fixture(Program::Frc, 118));

    let scoutlink = upstreams.scoutlink();
    let node = scoutlink.node(&team_id(Program::Frc, 118)).await?;

    match node {
        Node::Team(team) => {
            assert_eq!(team.program, Program::Frc);
            assert_eq!(team.number, 118);
        }
        other => panic!("expected a team node, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn match_id_dispatches_through_its_parent_event() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();

    let mut event = event_fixture(2024, "TXHOU");
    event.program = Field::Value(Program::Ftc);
    upstreams.event_index.push(event);

    let parent = event_id(2024, "TXHOU");
    upstreams
        .match_index
        .push(match_fixture(&parent, MatchLevel::Qualification, 12, 1));

    let scoutlink = upstreams.scoutlink();
    let node = scoutlink
        .node(&match_id(&parent, MatchLevel::Qualification, 12, 1))
        .await?;

    match node {
        Node::Match(m) => {
            assert_eq!(m.event, parent);
            assert_eq!(m.number, 12);
        }
        other => panic!("expected a match node, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn uuid_is_recognized_as_a_user_without_touching_sources() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    let scoutlink = upstreams.scoutlink();

    let raw = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    let node = scoutlink.node(&OpaqueId::new(raw)).await?;

    match node {
        Node::User(user) => {
            assert_eq!(user.uuid, Uuid::try_parse(raw)?);
            assert!(user.username.is_absent());
        }
        other => panic!("expected a user node, got {other:?}"),
    }
    assert_eq!(upstreams.team_index.calls(), 0);
    assert_eq!(upstreams.event_index.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn role_id_resolves_to_a_shell_record() -> anyhow::Result<()> {
    let upstreams = TestUpstreams::new();
    let scoutlink = upstreams.scoutlink();

    let id = encode_id(&RoleKey::new("event-admin"))?;
    let node = scoutlink.node(&id).await?;

    match node {
        Node::Role(role) => assert_eq!(role.name, "event-admin"),
        other => panic!("expected a role node, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn garbage_id_is_rejected() {
    let upstreams = TestUpstreams::new();
    let scoutlink = upstreams.scoutlink();

    for bad in ["", "!!!", "AAAA", "dGVhbQ"] {
        let err = scoutlink.node(&OpaqueId::new(bad)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }), "{bad:?}");
    }
}

#[tokio::test]
async fn id_of_the_wrong_kind_is_rejected_by_a_typed_lookup() {
    let upstreams = TestUpstreams::new();
    let scoutlink = upstreams.scoutlink();

    let err = scoutlink
        .teams()
        .get(&event_id(2024, "TXHOU"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidIdentifier { .. }));
}
