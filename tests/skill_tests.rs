use broadside::{GameError, SkillKind, SkillSet, SkillSpec};

fn catalogue() -> Vec<SkillSpec> {
    SkillKind::ALL.iter().map(|&k| SkillSpec::standard(k)).collect()
}

#[test]
fn test_acquire_deducts_points() {
    let mut skills = SkillSet::new(5, &catalogue());
    assert_eq!(skills.acquire(SkillKind::Sonar).unwrap(), 1);
    assert_eq!(skills.points(), 2);
    assert_eq!(skills.uses(SkillKind::Sonar), Some(1));
    assert_eq!(skills.acquire(SkillKind::Repair).unwrap(), 1);
    assert_eq!(skills.points(), 0);
    let owned: Vec<_> = skills.owned().collect();
    assert_eq!(owned, vec![(SkillKind::Sonar, 1), (SkillKind::Repair, 1)]);
}

#[test]
fn test_insufficient_points_leaves_state_unchanged() {
    let mut skills = SkillSet::new(5, &catalogue());
    skills.acquire(SkillKind::Barrage).unwrap();
    let before = skills.clone();
    assert_eq!(
        skills.acquire(SkillKind::Sonar).unwrap_err(),
        GameError::InsufficientPoints {
            skill: SkillKind::Sonar,
            cost: 3,
            available: 1
        }
    );
    assert_eq!(skills, before);
}

#[test]
fn test_skill_not_offered() {
    let mut skills = SkillSet::new(10, &[SkillSpec::standard(SkillKind::Repair)]);
    assert_eq!(
        skills.acquire(SkillKind::Barrage).unwrap_err(),
        GameError::SkillNotOffered {
            skill: SkillKind::Barrage
        }
    );
    assert_eq!(skills.cost(SkillKind::Barrage), None);
    assert_eq!(skills.cost(SkillKind::Repair), Some(2));
}

#[test]
fn test_consume_until_exhausted() {
    let mut skills = SkillSet::new(4, &catalogue());
    assert_eq!(
        skills.consume(SkillKind::Repair).unwrap_err(),
        GameError::SkillNotOwned {
            skill: SkillKind::Repair
        }
    );
    skills.acquire(SkillKind::Repair).unwrap();
    skills.acquire(SkillKind::Repair).unwrap();
    assert_eq!(skills.uses(SkillKind::Repair), Some(2));
    assert!(skills.can_use(SkillKind::Repair));
    assert_eq!(skills.consume(SkillKind::Repair).unwrap(), 1);
    assert_eq!(skills.consume(SkillKind::Repair).unwrap(), 0);
    assert!(!skills.can_use(SkillKind::Repair));
    assert_eq!(
        skills.consume(SkillKind::Repair).unwrap_err(),
        GameError::NoUsesRemaining {
            skill: SkillKind::Repair
        }
    );
    assert_eq!(skills.uses(SkillKind::Repair), Some(0));
}

#[test]
fn test_purchase_cost() {
    let skills = SkillSet::new(5, &catalogue());
    assert_eq!(skills.purchase_cost(SkillKind::Repair, 0), Some(0));
    assert_eq!(skills.purchase_cost(SkillKind::Repair, 2), Some(4));
    assert_eq!(skills.purchase_cost(SkillKind::Sonar, 1), Some(3));
    assert_eq!(skills.purchase_cost(SkillKind::Barrage, 1), Some(4));
}

#[test]
fn test_purchase_cost_outside_catalogue() {
    let skills = SkillSet::new(5, &catalogue()[..1]);
    assert_eq!(skills.purchase_cost(SkillKind::Barrage, 1), None);
}
