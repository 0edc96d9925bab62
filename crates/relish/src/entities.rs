//! The Member and Team record types and their field references.
//!
//! A `Member` optionally belongs to a `Team` through a lazy association.
//! The `member` and `team` modules expose field references for building
//! typed queries, e.g. `member::AGE.gt(18)`.

use crate::association::Association;
use crate::entity::Entity;
use crate::result::{FromRow, ResultLayout};
use crate::session::Session;
use alloc::string::String;
use alloc::vec::Vec;
use relish_core::schema::{Column, Table};
use relish_core::{DataType, Error, RecordId, Result, Value};

/// A team of members.
#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    id: Option<RecordId>,
    pub name: Option<String>,
}

impl Team {
    /// Creates a new unpersisted team.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// The members of this team, queried from the owning side. An
    /// unpersisted team has no members.
    pub fn members(&self, session: &Session) -> Result<Vec<Member>> {
        let id = match self.id {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        session
            .select_from::<Member>()
            .filter(member::TEAM.eq(id as i64))
            .fetch_list()
    }
}

impl Entity for Team {
    const TABLE: &'static str = "team";
    const WIDTH: usize = 2;

    fn schema() -> Table {
        Table::new(
            Self::TABLE,
            alloc::vec![
                Column::new("id", DataType::Int64),
                Column::new("name", DataType::String).nullable(true),
            ],
        )
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_values(&self) -> Vec<Value> {
        alloc::vec![
            self.id.map(|id| id as i64).into(),
            self.name.clone().into(),
        ]
    }

    fn from_values(values: &[Value]) -> Result<Self> {
        Ok(Self {
            id: required_id(values, 0, Self::TABLE)?,
            name: values.get(1).and_then(|v| v.as_str()).map(String::from),
        })
    }
}

impl FromRow for Team {
    fn from_row(values: &[Value], layout: &ResultLayout) -> Result<Self> {
        let entry = layout
            .entry(Self::TABLE)
            .ok_or_else(|| Error::table_not_found(Self::TABLE))?;
        Self::from_values(&values[entry.offset..entry.offset + entry.len])
    }
}

/// A member, optionally belonging to a team.
#[derive(Clone, Debug)]
pub struct Member {
    id: Option<RecordId>,
    pub username: Option<String>,
    pub age: Option<i64>,
    pub team: Association<Team>,
}

impl Member {
    /// Creates a new unpersisted member with no team.
    pub fn new(username: impl Into<String>, age: i64) -> Self {
        Self {
            id: None,
            username: Some(username.into()),
            age: Some(age),
            team: Association::none(),
        }
    }

    /// Creates a member without a username.
    pub fn anonymous(age: i64) -> Self {
        Self {
            id: None,
            username: None,
            age: Some(age),
            team: Association::none(),
        }
    }

    /// Puts this member in a team. Persist the team first so it has an
    /// identity for the reference.
    pub fn in_team(mut self, team: &Team) -> Self {
        self.team = Association::resolved(team.clone());
        self
    }
}

impl Entity for Member {
    const TABLE: &'static str = "member";
    const WIDTH: usize = 4;

    fn schema() -> Table {
        Table::new(
            Self::TABLE,
            alloc::vec![
                Column::new("id", DataType::Int64),
                Column::new("username", DataType::String).nullable(true),
                Column::new("age", DataType::Int64).nullable(true),
                Column::new("team_id", DataType::Int64).nullable(true),
            ],
        )
        .with_reference("team_id", Team::TABLE)
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_values(&self) -> Vec<Value> {
        alloc::vec![
            self.id.map(|id| id as i64).into(),
            self.username.clone().into(),
            self.age.into(),
            self.team.key().map(|id| id as i64).into(),
        ]
    }

    fn from_values(values: &[Value]) -> Result<Self> {
        let team_key = values.get(3).and_then(|v| v.as_i64()).map(|id| id as u64);
        Ok(Self {
            id: required_id(values, 0, Self::TABLE)?,
            username: values.get(1).and_then(|v| v.as_str()).map(String::from),
            age: values.get(2).and_then(|v| v.as_i64()),
            team: Association::from_key(team_key),
        })
    }

    fn resolve_associations(&self, session: &Session) -> Result<()> {
        self.team.resolve(session)?;
        Ok(())
    }
}

impl FromRow for Member {
    fn from_row(values: &[Value], layout: &ResultLayout) -> Result<Self> {
        let entry = layout
            .entry(Self::TABLE)
            .ok_or_else(|| Error::table_not_found(Self::TABLE))?;
        let mut member = Self::from_values(&values[entry.offset..entry.offset + entry.len])?;

        // A fetch-joined team arrives as a resolved association. A null team
        // slice (outer join padding) leaves the association empty.
        if let Some(team_entry) = layout.entry(Team::TABLE).filter(|e| e.fetched) {
            let slice = &values[team_entry.offset..team_entry.offset + team_entry.len];
            if !slice.first().map(Value::is_null).unwrap_or(true) {
                member.team = Association::resolved(Team::from_values(slice)?);
            }
        }
        Ok(member)
    }
}

fn required_id(values: &[Value], index: usize, table: &str) -> Result<Option<RecordId>> {
    match values.get(index) {
        Some(Value::Int64(id)) => Ok(Some(*id as RecordId)),
        Some(Value::Null) | None => Err(Error::invalid_operation(alloc::format!(
            "row for table {} has no identity",
            table
        ))),
        Some(_) => Err(Error::invalid_operation(alloc::format!(
            "row for table {} has a non-integer identity",
            table
        ))),
    }
}

/// Field references for the member table.
pub mod member {
    use crate::query::FieldRef;

    pub const ID: FieldRef = FieldRef::new("member", "id", 0);
    pub const USERNAME: FieldRef = FieldRef::new("member", "username", 1);
    pub const AGE: FieldRef = FieldRef::new("member", "age", 2);
    /// Reference column linking a member to its team.
    pub const TEAM: FieldRef = FieldRef::new("member", "team_id", 3);
}

/// Field references for the team table.
pub mod team {
    use crate::query::FieldRef;

    pub const ID: FieldRef = FieldRef::new("team", "id", 0);
    pub const NAME: FieldRef = FieldRef::new("team", "name", 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_member_round_trip() {
        let mut member = Member::new("member1", 10);
        member.assign_id(7);

        let values = member.to_values();
        assert_eq!(values[0], Value::Int64(7));
        assert_eq!(values[3], Value::Null);

        let decoded = Member::from_values(&values).unwrap();
        assert_eq!(decoded.id(), Some(7));
        assert_eq!(decoded.username.as_deref(), Some("member1"));
        assert_eq!(decoded.age, Some(10));
        assert!(decoded.team.key().is_none());
    }

    #[test]
    fn test_anonymous_member() {
        let member = Member::anonymous(100);
        let values = member.to_values();
        assert_eq!(values[1], Value::Null);
        assert_eq!(values[2], Value::Int64(100));
    }

    #[test]
    fn test_member_decode_with_fetched_team() {
        let mut layout = ResultLayout::new();
        layout.push("member", 4, false);
        layout.push("team", 2, true);

        let values = vec![
            Value::Int64(1),
            Value::String("member1".into()),
            Value::Int64(10),
            Value::Int64(1),
            Value::Int64(1),
            Value::String("teamA".into()),
        ];

        let member = Member::from_row(&values, &layout).unwrap();
        assert!(member.team.is_resolved());
        assert_eq!(member.team.get().unwrap().name.as_deref(), Some("teamA"));
    }

    #[test]
    fn test_member_decode_without_fetch_is_unresolved() {
        let mut layout = ResultLayout::new();
        layout.push("member", 4, false);

        let values = vec![
            Value::Int64(1),
            Value::String("member1".into()),
            Value::Int64(10),
            Value::Int64(1),
        ];

        let member = Member::from_row(&values, &layout).unwrap();
        assert!(!member.team.is_resolved());
        assert_eq!(member.team.key(), Some(1));
    }

    #[test]
    fn test_schema_reference() {
        let schema = Member::schema();
        let reference = schema.get_reference("team_id").unwrap();
        assert_eq!(reference.table, "team");
        assert_eq!(schema.columns().len(), Member::WIDTH);
    }

    #[test]
    fn test_row_without_identity_is_rejected() {
        let values = vec![Value::Null, Value::Null, Value::Null, Value::Null];
        assert!(Member::from_values(&values).is_err());
    }
}
