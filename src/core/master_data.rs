//! Master data business logic - the lookup lists maintained by administrators.
//!
//! References from budget plans and purchase requests into these lists are
//! soft keys. Deleting an option never cascades; a dangling reference is
//! resolved to the [`UNKNOWN`] sentinel by [`MasterLookup`] when it is shown.

use crate::{
    core::{numbering, project},
    entities::master_option,
    errors::{Error, Result},
    models::{CrudAction, MasterDataCategory, MasterOption},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Text shown for a reference whose master option no longer exists.
pub const UNKNOWN: &str = "Unknown";

fn option_from_model(model: master_option::Model) -> MasterOption {
    MasterOption {
        id: model.id,
        code: model.code,
        name: model.name,
        description: model.description,
        category: model.category,
        uom: model.uom,
        is_active: model.is_active,
    }
}

fn to_active_model(category: MasterDataCategory, option: &MasterOption) -> master_option::ActiveModel {
    master_option::ActiveModel {
        id: Set(option.id.clone()),
        list: Set(category.as_str().to_string()),
        code: Set(option.code.clone()),
        name: Set(option.name.clone()),
        description: Set(option.description.clone()),
        category: Set(option.category.clone()),
        uom: Set(option.uom.clone()),
        is_active: Set(option.is_active),
    }
}

/// Inserts one option into a stored list; used by seeding and create.
pub(crate) async fn insert_option<C>(
    conn: &C,
    category: MasterDataCategory,
    option: &MasterOption,
) -> Result<()>
where
    C: ConnectionTrait,
{
    to_active_model(category, option).insert(conn).await?;
    Ok(())
}

/// Retrieves the options of one master list.
///
/// The `projects` list is projected from the project registry.
pub async fn list_master_options<C>(
    conn: &C,
    category: MasterDataCategory,
) -> Result<Vec<MasterOption>>
where
    C: ConnectionTrait,
{
    if category == MasterDataCategory::Projects {
        let projects = project::list_projects(conn).await?;
        return Ok(projects.iter().map(project::to_master_option).collect());
    }

    let rows = master_option::Entity::find()
        .filter(master_option::Column::List.eq(category.as_str()))
        .order_by_asc(master_option::Column::Code)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(option_from_model).collect())
}

/// Creates, replaces or deletes an option of a master list.
///
/// Code and name are required on create and update; a blank id on create is
/// generated. The `projects` list cannot be edited here because it is derived
/// from the project registry.
pub async fn manage_master_data(
    db: &DatabaseConnection,
    category: MasterDataCategory,
    action: CrudAction,
    mut option: MasterOption,
) -> Result<MasterOption> {
    if category == MasterDataCategory::Projects {
        return Err(Error::validation(
            "Project options are maintained through the project registry.",
        ));
    }

    if action != CrudAction::Delete
        && (option.code.trim().is_empty() || option.name.trim().is_empty())
    {
        return Err(Error::validation("Code/ID and Name are required fields."));
    }

    let existing = if option.id.trim().is_empty() {
        None
    } else {
        master_option::Entity::find_by_id(option.id.clone())
            .filter(master_option::Column::List.eq(category.as_str()))
            .one(db)
            .await?
    };

    match action {
        CrudAction::Create => {
            if option.id.trim().is_empty() {
                option.id = numbering::new_id("opt");
            } else if existing.is_some() {
                return Err(Error::validation(format!(
                    "{category} option {} already exists.",
                    option.id
                )));
            }
            insert_option(db, category, &option).await?;
            info!("Created {} option {}", category, option.code);
            Ok(option)
        }
        CrudAction::Update => {
            if existing.is_none() {
                return Err(Error::not_found("Master option", &option.id));
            }
            to_active_model(category, &option).update(db).await?;
            info!("Updated {} option {}", category, option.code);
            Ok(option)
        }
        CrudAction::Delete => {
            let existing = existing.ok_or_else(|| Error::not_found("Master option", &option.id))?;
            master_option::Entity::delete_by_id(existing.id.clone())
                .exec(db)
                .await?;
            info!("Deleted {} option {}", category, existing.code);
            Ok(option_from_model(existing))
        }
    }
}

/// Every master list loaded at once, for resolving ids to codes and names.
#[derive(Debug, Clone, Default)]
pub struct MasterLookup {
    lists: HashMap<MasterDataCategory, Vec<MasterOption>>,
}

impl MasterLookup {
    /// Loads every list, including the projected `projects` list.
    pub async fn load<C>(conn: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let mut lists = HashMap::new();
        for category in MasterDataCategory::ALL {
            lists.insert(category, list_master_options(conn, category).await?);
        }
        Ok(Self { lists })
    }

    /// Builds a lookup from already loaded lists.
    #[must_use]
    pub fn from_lists(lists: HashMap<MasterDataCategory, Vec<MasterOption>>) -> Self {
        Self { lists }
    }

    /// The options of one list, empty when the list was never loaded.
    #[must_use]
    pub fn options(&self, category: MasterDataCategory) -> &[MasterOption] {
        self.lists.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds an option by id within a list.
    #[must_use]
    pub fn find(&self, category: MasterDataCategory, id: &str) -> Option<&MasterOption> {
        self.options(category).iter().find(|option| option.id == id)
    }

    /// Code of the referenced option, or [`UNKNOWN`] for a dangling reference.
    #[must_use]
    pub fn code_of(&self, category: MasterDataCategory, id: &str) -> &str {
        self.find(category, id)
            .map_or(UNKNOWN, |option| option.code.as_str())
    }

    /// Name of the referenced option, or [`UNKNOWN`] for a dangling reference.
    #[must_use]
    pub fn name_of(&self, category: MasterDataCategory, id: &str) -> &str {
        self.find(category, id)
            .map_or(UNKNOWN, |option| option.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_update_and_list_options() -> Result<()> {
        let db = setup_test_db().await?;

        let created = manage_master_data(
            &db,
            MasterDataCategory::Ios,
            CrudAction::Create,
            sample_option("io1", "IO-1001", "New Machine Inv"),
        )
        .await?;
        assert_eq!(created.id, "io1");

        let mut renamed = created.clone();
        renamed.name = "Machine Investment".to_string();
        manage_master_data(&db, MasterDataCategory::Ios, CrudAction::Update, renamed).await?;

        let ios = list_master_options(&db, MasterDataCategory::Ios).await?;
        assert_eq!(ios.len(), 1);
        assert_eq!(ios[0].name, "Machine Investment");

        // Other lists are unaffected
        assert!(list_master_options(&db, MasterDataCategory::Plants).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_requires_code_and_name() -> Result<()> {
        let db = setup_test_db().await?;
        let result = manage_master_data(
            &db,
            MasterDataCategory::Departments,
            CrudAction::Create,
            sample_option("d1", "", "Engineering"),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_projects_list_is_read_only() -> Result<()> {
        let db = setup_test_db().await?;
        let result = manage_master_data(
            &db,
            MasterDataCategory::Projects,
            CrudAction::Create,
            sample_option("prj9", "P-9", "Side project"),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_option_resolves_to_unknown() -> Result<()> {
        let db = setup_test_db().await?;
        let option = manage_master_data(
            &db,
            MasterDataCategory::CostCenters,
            CrudAction::Create,
            sample_option("cc1", "CC-501", "Plant A - Assy"),
        )
        .await?;

        let before = MasterLookup::load(&db).await?;
        assert_eq!(before.code_of(MasterDataCategory::CostCenters, "cc1"), "CC-501");

        manage_master_data(&db, MasterDataCategory::CostCenters, CrudAction::Delete, option)
            .await?;

        let after = MasterLookup::load(&db).await?;
        assert_eq!(after.code_of(MasterDataCategory::CostCenters, "cc1"), UNKNOWN);
        assert_eq!(after.name_of(MasterDataCategory::CostCenters, "cc1"), UNKNOWN);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_option_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = manage_master_data(
            &db,
            MasterDataCategory::Suppliers,
            CrudAction::Delete,
            sample_option("sup9", "V009", "Nobody"),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
