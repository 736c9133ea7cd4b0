use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::list::{List as DomainList, NewList as DomainNewList};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::lists)]
pub struct List {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::list_collaborators)]
#[diesel(belongs_to(List, foreign_key = list_id))]
pub struct ListCollaborator {
    pub id: i32,
    pub list_id: i32,
    pub email: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::lists)]
pub struct NewList<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::list_collaborators)]
pub struct NewListCollaborator<'a> {
    pub list_id: i32,
    pub email: &'a str,
}

impl List {
    pub fn into_domain(self, collaborators: Vec<String>) -> DomainList {
        DomainList {
            id: self.id,
            hub_id: self.hub_id,
            name: self.name,
            deleted: self.deleted,
            deleted_at: self.deleted_at,
            collaborators,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewList> for NewList<'a> {
    fn from(value: &'a DomainNewList) -> Self {
        Self {
            hub_id: value.hub_id,
            name: value.name.as_str(),
            updated_at: value.updated_at,
        }
    }
}
