use entity_store::{Filters, TypedEntity};
use serde::{Deserialize, Serialize};

use crate::support::entities;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedEntity)]
#[entity(name = "DailyUpdate")]
struct Update {
    #[serde(default)]
    id: String,
    #[serde(default)]
    created_date: String,
    project_id: String,
    notes: String,
}

#[derive(Debug, Serialize, Deserialize, TypedEntity)]
struct Project {
    #[serde(default)]
    id: String,
    name: String,
}

#[test]
fn typed_views_through_the_registry() {
    let entities = entities();
    let updates = entities.typed::<Update>().unwrap();

    let created = updates
        .create(&Update {
            id: String::new(),
            created_date: String::new(),
            project_id: "p1".into(),
            notes: "decking replaced".into(),
        })
        .unwrap();
    assert!(!created.id.is_empty());
    assert!(!created.created_date.is_empty());

    let for_p1 = updates
        .filter(&Filters::new().eq("project_id", "p1"), None)
        .unwrap();
    assert_eq!(for_p1, vec![created]);

    assert_eq!(Project::ENTITY, "Project");
    let projects = entities.typed::<Project>().unwrap();
    projects
        .create(&Project {
            id: String::new(),
            name: "Oak Ave".into(),
        })
        .unwrap();
    assert_eq!(entities.projects().count().unwrap(), 1);
}
