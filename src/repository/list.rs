use std::collections::HashMap;

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;

use crate::domain::list::{List as DomainList, ListListQuery, NewList as DomainNewList};
use crate::models::list::{
    List as DbList, ListCollaborator as DbListCollaborator, NewList as DbNewList,
    NewListCollaborator as DbNewListCollaborator,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ListReader, ListWriter};

fn load_collaborators(
    conn: &mut SqliteConnection,
    list_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<String>>> {
    use crate::schema::list_collaborators;

    let mut by_list: HashMap<i32, Vec<String>> = HashMap::new();

    if !list_ids.is_empty() {
        let rows = list_collaborators::table
            .filter(list_collaborators::list_id.eq_any(list_ids))
            .order(list_collaborators::id.asc())
            .load::<DbListCollaborator>(conn)?;

        for row in rows {
            by_list.entry(row.list_id).or_default().push(row.email);
        }
    }

    Ok(by_list)
}

impl ListReader for DieselRepository {
    fn get_list_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DomainList>> {
        use crate::schema::lists;

        let mut conn = self.conn()?;
        let list = lists::table
            .filter(lists::id.eq(id))
            .filter(lists::hub_id.eq(hub_id))
            .first::<DbList>(&mut conn)
            .optional()?;

        let Some(list) = list else {
            return Ok(None);
        };

        let mut collaborators = load_collaborators(&mut conn, &[list.id])?;
        let emails = collaborators.remove(&list.id).unwrap_or_default();

        Ok(Some(list.into_domain(emails)))
    }

    fn list_lists(&self, query: ListListQuery) -> RepositoryResult<(usize, Vec<DomainList>)> {
        use crate::schema::lists;

        let mut conn = self.conn()?;

        let mut count_query = lists::table
            .filter(lists::hub_id.eq(query.hub_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !query.include_deleted {
            count_query = count_query.filter(lists::deleted.eq(false));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = lists::table
            .filter(lists::hub_id.eq(query.hub_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !query.include_deleted {
            items = items.filter(lists::deleted.eq(false));
        }

        items = items.order(lists::name.asc());

        if let Some(pagination) = query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_lists = items.load::<DbList>(&mut conn)?;
        let list_ids: Vec<i32> = db_lists.iter().map(|list| list.id).collect();
        let mut collaborators = load_collaborators(&mut conn, &list_ids)?;

        let lists = db_lists
            .into_iter()
            .map(|list| {
                let emails = collaborators.remove(&list.id).unwrap_or_default();
                list.into_domain(emails)
            })
            .collect();

        Ok((total, lists))
    }
}

impl ListWriter for DieselRepository {
    fn create_list(&self, new_list: &DomainNewList) -> RepositoryResult<DomainList> {
        use crate::schema::lists;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(lists::table)
            .values(&DbNewList::from(new_list))
            .get_result::<DbList>(&mut conn)
            .map_err(|err| match err {
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    RepositoryError::Conflict(format!("list `{}` already exists", new_list.name))
                }
                other => other.into(),
            })?;

        Ok(created.into_domain(Vec::new()))
    }

    fn soft_delete_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<DomainList> {
        use crate::schema::lists;

        let mut conn = self.conn()?;
        let now = chrono::Local::now().naive_utc();

        let updated = diesel::update(
            lists::table
                .filter(lists::id.eq(list_id))
                .filter(lists::hub_id.eq(hub_id)),
        )
        .set((
            lists::deleted.eq(true),
            lists::deleted_at.eq(Some(now)),
            lists::updated_at.eq(now),
        ))
        .get_result::<DbList>(&mut conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

        let mut collaborators = load_collaborators(&mut conn, &[updated.id])?;
        let emails = collaborators.remove(&updated.id).unwrap_or_default();

        Ok(updated.into_domain(emails))
    }

    fn restore_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<DomainList> {
        use crate::schema::lists;

        let mut conn = self.conn()?;
        let now = chrono::Local::now().naive_utc();

        let updated = diesel::update(
            lists::table
                .filter(lists::id.eq(list_id))
                .filter(lists::hub_id.eq(hub_id)),
        )
        .set((
            lists::deleted.eq(false),
            lists::deleted_at.eq(None::<chrono::NaiveDateTime>),
            lists::updated_at.eq(now),
        ))
        .get_result::<DbList>(&mut conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

        let mut collaborators = load_collaborators(&mut conn, &[updated.id])?;
        let emails = collaborators.remove(&updated.id).unwrap_or_default();

        Ok(updated.into_domain(emails))
    }

    fn delete_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::{list_collaborators, list_entries, lists, purchase_requests, submissions};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let list = lists::table
                .filter(lists::id.eq(list_id))
                .filter(lists::hub_id.eq(hub_id))
                .first::<DbList>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if !list.deleted {
                return Err(RepositoryError::InvalidState(format!(
                    "list {list_id} must be moved to the trash before it can be deleted"
                )));
            }

            let submission_ids: Vec<i32> = submissions::table
                .filter(submissions::list_id.eq(list_id))
                .select(submissions::id)
                .load(conn)?;

            if !submission_ids.is_empty() {
                diesel::delete(
                    purchase_requests::table
                        .filter(purchase_requests::submission_id.eq_any(&submission_ids)),
                )
                .execute(conn)?;
                diesel::delete(
                    submissions::table.filter(submissions::id.eq_any(&submission_ids)),
                )
                .execute(conn)?;
            }

            diesel::delete(list_entries::table.filter(list_entries::list_id.eq(list_id)))
                .execute(conn)?;
            diesel::delete(
                list_collaborators::table.filter(list_collaborators::list_id.eq(list_id)),
            )
            .execute(conn)?;
            diesel::delete(lists::table.filter(lists::id.eq(list_id))).execute(conn)?;

            Ok(())
        })
    }

    fn set_list_collaborators(
        &self,
        list_id: i32,
        hub_id: i32,
        emails: &[String],
    ) -> RepositoryResult<DomainList> {
        use crate::schema::{list_collaborators, lists};

        let mut conn = self.conn()?;

        conn.transaction::<DomainList, RepositoryError, _>(|conn| {
            let list = lists::table
                .filter(lists::id.eq(list_id))
                .filter(lists::hub_id.eq(hub_id))
                .first::<DbList>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            diesel::delete(
                list_collaborators::table.filter(list_collaborators::list_id.eq(list_id)),
            )
            .execute(conn)?;

            if !emails.is_empty() {
                let payload: Vec<DbNewListCollaborator> = emails
                    .iter()
                    .map(|email| DbNewListCollaborator {
                        list_id,
                        email: email.as_str(),
                    })
                    .collect();

                diesel::insert_into(list_collaborators::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            Ok(list.into_domain(emails.to_vec()))
        })
    }
}
