//! Project registry business logic.
//!
//! Projects are the single source of truth for the `projects` master list:
//! budget plans reference a project id, and the lookup list shown next to the
//! other master data is derived on read through [`to_master_option`]. There is
//! no second copy to keep in sync.

use crate::{
    core::numbering,
    entities::{project, project_milestone},
    errors::{Error, Result},
    models::{CrudAction, MasterOption, Milestone, Project, ProjectSchedule},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Reduced projection of a project used wherever a project is picked from a list.
#[must_use]
pub fn to_master_option(project: &Project) -> MasterOption {
    MasterOption {
        id: project.id.clone(),
        code: project.code.clone(),
        name: project.name.clone(),
        description: project.description.clone(),
        category: None,
        uom: None,
        is_active: None,
    }
}

fn project_from_rows(
    model: project::Model,
    milestones: Vec<project_milestone::Model>,
) -> Result<Project> {
    Ok(Project {
        status: model.status.parse()?,
        schedule: ProjectSchedule {
            die_go: model.die_go,
            t0: model.t0,
            pp1: model.pp1,
            pp2: model.pp2,
            pp3: model.pp3,
            mass_pro: model.mass_pro,
        },
        custom_milestones: milestones
            .into_iter()
            .map(|m| Milestone {
                id: m.id,
                name: m.name,
                date: m.date,
                is_completed: m.is_completed,
            })
            .collect(),
        id: model.id,
        code: model.code,
        name: model.name,
        customer: model.customer,
        model: model.model,
        description: model.description,
        year: model.year,
        project_manager: model.project_manager,
        budget_allocation: model.budget_allocation,
    })
}

fn to_active_model(project: &Project) -> project::ActiveModel {
    project::ActiveModel {
        id: Set(project.id.clone()),
        code: Set(project.code.clone()),
        name: Set(project.name.clone()),
        customer: Set(project.customer.clone()),
        model: Set(project.model.clone()),
        description: Set(project.description.clone()),
        year: Set(project.year.clone()),
        project_manager: Set(project.project_manager.clone()),
        budget_allocation: Set(project.budget_allocation),
        status: Set(project.status.as_str().to_string()),
        die_go: Set(project.schedule.die_go),
        t0: Set(project.schedule.t0),
        pp1: Set(project.schedule.pp1),
        pp2: Set(project.schedule.pp2),
        pp3: Set(project.schedule.pp3),
        mass_pro: Set(project.schedule.mass_pro),
    }
}

async fn insert_milestones<C>(conn: &C, project: &Project) -> Result<()>
where
    C: ConnectionTrait,
{
    for (position, milestone) in (0_i32..).zip(&project.custom_milestones) {
        project_milestone::ActiveModel {
            id: Set(milestone.id.clone()),
            project_id: Set(project.id.clone()),
            position: Set(position),
            name: Set(milestone.name.clone()),
            date: Set(milestone.date),
            is_completed: Set(milestone.is_completed),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Inserts a project with its milestones; callers wrap this in a transaction.
pub(crate) async fn insert_project<C>(conn: &C, project: &Project) -> Result<()>
where
    C: ConnectionTrait,
{
    to_active_model(project).insert(conn).await?;
    insert_milestones(conn, project).await
}

/// Retrieves every project with its milestones, ordered by code.
pub async fn list_projects<C>(conn: &C) -> Result<Vec<Project>>
where
    C: ConnectionTrait,
{
    let projects = project::Entity::find()
        .order_by_asc(project::Column::Code)
        .all(conn)
        .await?;

    let mut milestones: HashMap<String, Vec<project_milestone::Model>> = HashMap::new();
    for milestone in project_milestone::Entity::find()
        .order_by_asc(project_milestone::Column::Position)
        .all(conn)
        .await?
    {
        milestones
            .entry(milestone.project_id.clone())
            .or_default()
            .push(milestone);
    }

    projects
        .into_iter()
        .map(|model| {
            let own = milestones.remove(&model.id).unwrap_or_default();
            project_from_rows(model, own)
        })
        .collect()
}

/// Finds a project by id, returning None if it does not exist.
pub async fn get_project<C>(conn: &C, project_id: &str) -> Result<Option<Project>>
where
    C: ConnectionTrait,
{
    let Some(model) = project::Entity::find_by_id(project_id.to_string())
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let milestones = project_milestone::Entity::find()
        .filter(project_milestone::Column::ProjectId.eq(project_id))
        .order_by_asc(project_milestone::Column::Position)
        .all(conn)
        .await?;

    project_from_rows(model, milestones).map(Some)
}

fn validate(project: &Project) -> Result<()> {
    if project.code.trim().is_empty()
        || project.name.trim().is_empty()
        || project.customer.trim().is_empty()
    {
        return Err(Error::validation(
            "Project Code, Name, and Customer are required.",
        ));
    }
    if project
        .custom_milestones
        .iter()
        .any(|milestone| milestone.name.trim().is_empty())
    {
        return Err(Error::validation("Milestone name and date are required"));
    }
    Ok(())
}

/// Creates, replaces or deletes a project together with its milestones.
///
/// Create assigns ids where they are blank. Update is a full replacement keyed
/// by id, milestones included. Every action runs in one transaction and
/// returns the project as stored (or as it was, for delete).
pub async fn manage_project(
    db: &DatabaseConnection,
    action: CrudAction,
    mut project: Project,
) -> Result<Project> {
    match action {
        CrudAction::Create => {
            validate(&project)?;
            if project.id.trim().is_empty() {
                project.id = numbering::new_id("prj");
            }
            for milestone in &mut project.custom_milestones {
                if milestone.id.trim().is_empty() {
                    milestone.id = numbering::new_id("m");
                }
            }

            let txn = db.begin().await?;
            insert_project(&txn, &project).await?;
            txn.commit().await?;
            info!("Created project {} ({})", project.code, project.id);
        }
        CrudAction::Update => {
            validate(&project)?;
            for milestone in &mut project.custom_milestones {
                if milestone.id.trim().is_empty() {
                    milestone.id = numbering::new_id("m");
                }
            }

            let txn = db.begin().await?;
            project::Entity::find_by_id(project.id.clone())
                .one(&txn)
                .await?
                .ok_or_else(|| Error::not_found("Project", &project.id))?;

            to_active_model(&project).update(&txn).await?;
            project_milestone::Entity::delete_many()
                .filter(project_milestone::Column::ProjectId.eq(project.id.as_str()))
                .exec(&txn)
                .await?;
            insert_milestones(&txn, &project).await?;
            txn.commit().await?;
            info!("Updated project {} ({})", project.code, project.id);
        }
        CrudAction::Delete => {
            let txn = db.begin().await?;
            let existing = get_project(&txn, &project.id)
                .await?
                .ok_or_else(|| Error::not_found("Project", &project.id))?;

            project_milestone::Entity::delete_many()
                .filter(project_milestone::Column::ProjectId.eq(project.id.as_str()))
                .exec(&txn)
                .await?;
            project::Entity::delete_by_id(project.id.clone())
                .exec(&txn)
                .await?;
            txn.commit().await?;
            info!("Deleted project {} ({})", existing.code, existing.id);
            return Ok(existing);
        }
    }

    Ok(project)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::master_data::list_master_options;
    use crate::models::{MasterDataCategory, ProjectStatus};
    use crate::test_utils::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_project_appears_in_projects_master_list() -> Result<()> {
        let db = setup_test_db().await?;

        let created = manage_project(&db, CrudAction::Create, sample_project("P-X")).await?;
        assert!(created.id.starts_with("prj-"));

        let options = list_master_options(&db, MasterDataCategory::Projects).await?;
        let option = options.iter().find(|o| o.id == created.id).unwrap();
        assert_eq!(option.code, "P-X");
        assert_eq!(option.name, "Test");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_project_removes_master_option() -> Result<()> {
        let db = setup_test_db().await?;
        let created = manage_project(&db, CrudAction::Create, sample_project("P-X")).await?;

        let removed = manage_project(&db, CrudAction::Delete, created.clone()).await?;
        assert_eq!(removed.code, "P-X");

        let options = list_master_options(&db, MasterDataCategory::Projects).await?;
        assert!(options.iter().all(|o| o.id != created.id));
        assert!(get_project(&db, &created.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_project_replaces_milestones_in_order() -> Result<()> {
        let db = setup_test_db().await?;
        let mut project = sample_project("P-Y");
        project.custom_milestones.push(Milestone {
            id: String::new(),
            name: "Kickoff Meeting".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            is_completed: true,
        });
        let mut created = manage_project(&db, CrudAction::Create, project).await?;

        created.name = "Renamed".to_string();
        created.status = ProjectStatus::Hold;
        created.custom_milestones.push(Milestone {
            id: String::new(),
            name: "Design Freeze".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            is_completed: false,
        });
        manage_project(&db, CrudAction::Update, created.clone()).await?;

        let stored = get_project(&db, &created.id).await?.unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.status, ProjectStatus::Hold);
        let names: Vec<_> = stored
            .custom_milestones
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Kickoff Meeting", "Design Freeze"]);

        let option = to_master_option(&stored);
        assert_eq!(option.name, "Renamed");

        Ok(())
    }

    #[tokio::test]
    async fn test_project_requires_code_name_and_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let mut project = sample_project("P-Z");
        project.customer = String::new();

        let result = manage_project(&db, CrudAction::Create, project).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_project_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let mut project = sample_project("P-Q");
        project.id = "missing".to_string();

        let result = manage_project(&db, CrudAction::Update, project).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }
}
