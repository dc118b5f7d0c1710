//! Club profile updates.
//!
//! An update overwrites the club's display fields, assigns the supplied
//! pictures to the leading picture slots, and replaces the club's tag set.
//! Tags and pictures are resolved before anything is written; the writes
//! themselves happen in one transaction.

use crate::{
    auth::RequestingAccount,
    models::{ClubTag, PICTURE_SLOTS},
    schema::*,
    DbPool,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use itertools::Itertools;
use serde::{Deserialize, Deserializer};
use std::{collections::HashSet, fmt};

pub const NAME_MAX: usize = 50;
pub const WEBSITE_MAX: usize = 500;
pub const EMAIL_MAX: usize = 500;
pub const GROUP_LINK_MAX: usize = 500;
pub const VIDEO_LINK_MAX: usize = 500;
pub const DESCRIPTION_MAX: usize = 4000;
pub const MAX_TAGS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Website,
    Email,
    GroupLink,
    VideoLink,
    Description,
    Tags,
    Pictures,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "name",
            Field::Website => "website",
            Field::Email => "email",
            Field::GroupLink => "group link",
            Field::VideoLink => "video link",
            Field::Description => "description",
            Field::Tags => "tags",
            Field::Pictures => "pictures",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(Field),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },
    #[error("at most {max} {field} are allowed")]
    TooMany { field: Field, max: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("no permission to edit this club")]
    NotOwner,
    #[error("the club does not exist")]
    ClubNotFound,
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("invalid tag")]
    UnknownTag,
    #[error("invalid picture")]
    ForeignPicture,
    #[error("database error: {0}")]
    Storage(#[from] diesel::result::Error),
    #[error("database pool error: {0}")]
    Pool(#[from] deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>),
}

/// `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A missing or null name deserializes as empty so it is reported as required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub group_link: Option<String>,
    pub video_link: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub published: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub tag_ids: Vec<String>,
    /// Assigned to picture slots in order, slot 1 first.
    #[serde(deserialize_with = "null_as_default")]
    pub picture_ids: Vec<String>,
}

fn check_len(field: Field, value: Option<&str>, max: usize) -> Result<(), FieldError> {
    match value {
        Some(v) if v.chars().count() > max => Err(FieldError::TooLong { field, max }),
        _ => Ok(()),
    }
}

impl ProfileUpdate {
    /// Checks the fields in a fixed order and stops at the first violation.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.name.trim().is_empty() {
            return Err(FieldError::Required(Field::Name));
        }
        check_len(Field::Name, Some(self.name.as_str()), NAME_MAX)?;
        check_len(Field::Website, self.website.as_deref(), WEBSITE_MAX)?;
        check_len(Field::Email, self.email.as_deref(), EMAIL_MAX)?;
        check_len(Field::GroupLink, self.group_link.as_deref(), GROUP_LINK_MAX)?;
        check_len(Field::VideoLink, self.video_link.as_deref(), VIDEO_LINK_MAX)?;
        check_len(Field::Description, self.description.as_deref(), DESCRIPTION_MAX)?;

        if self.tag_ids.len() > MAX_TAGS {
            return Err(FieldError::TooMany {
                field: Field::Tags,
                max: MAX_TAGS,
            });
        }
        if self.picture_ids.len() > PICTURE_SLOTS {
            return Err(FieldError::TooMany {
                field: Field::Pictures,
                max: PICTURE_SLOTS,
            });
        }
        Ok(())
    }

    /// Requested tag ids with duplicates removed, first occurrence wins.
    pub fn distinct_tags(&self) -> Vec<&str> {
        self.tag_ids.iter().map(String::as_str).unique().collect()
    }
}

/// Every requested tag has to resolve, otherwise nothing is applied.
pub fn check_tags(requested: &[&str], resolved: &[String]) -> Result<(), ProfileError> {
    if requested.len() != resolved.len() {
        return Err(ProfileError::UnknownTag);
    }
    Ok(())
}

pub fn check_pictures(requested: &[String], owned: &HashSet<String>) -> Result<(), ProfileError> {
    if requested.iter().all(|id| owned.contains(id)) {
        Ok(())
    } else {
        Err(ProfileError::ForeignPicture)
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = clubs)]
#[diesel(treat_none_as_null = true)]
struct ClubEdit<'a> {
    name: &'a str,
    website: Option<&'a str>,
    email: Option<&'a str>,
    group_link: Option<&'a str>,
    video_link: Option<&'a str>,
    description: Option<&'a str>,
    published: bool,
    updated_at: chrono::NaiveDateTime,
}

impl<'a> From<&'a ProfileUpdate> for ClubEdit<'a> {
    fn from(update: &'a ProfileUpdate) -> Self {
        Self {
            name: &update.name,
            website: update.website.as_deref(),
            email: update.email.as_deref(),
            group_link: update.group_link.as_deref(),
            video_link: update.video_link.as_deref(),
            description: update.description.as_deref(),
            published: update.published,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

/// Slots left as `None` are skipped by the changeset and keep their value.
#[derive(Debug, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = clubs)]
struct PictureSlotsEdit<'a> {
    pic1_id: Option<&'a str>,
    pic2_id: Option<&'a str>,
    pic3_id: Option<&'a str>,
    pic4_id: Option<&'a str>,
    pic5_id: Option<&'a str>,
    pic6_id: Option<&'a str>,
}

impl<'a> PictureSlotsEdit<'a> {
    fn assign(pictures: &'a [String]) -> Self {
        let mut slots: [Option<&str>; PICTURE_SLOTS] = [None; PICTURE_SLOTS];
        for (slot, id) in slots.iter_mut().zip(pictures) {
            *slot = Some(id);
        }
        let [pic1_id, pic2_id, pic3_id, pic4_id, pic5_id, pic6_id] = slots;
        Self {
            pic1_id,
            pic2_id,
            pic3_id,
            pic4_id,
            pic5_id,
            pic6_id,
        }
    }
}

pub async fn update_club_profile(
    pool: &DbPool,
    account: &RequestingAccount,
    club_id: &str,
    update: &ProfileUpdate,
) -> Result<(), ProfileError> {
    if account.club_id.as_deref() != Some(club_id) {
        return Err(ProfileError::NotOwner);
    }
    update.validate()?;

    let conn = &mut pool.get().await?;

    let tag_ids = update.distinct_tags();
    if !tag_ids.is_empty() {
        let resolved = tags::table
            .filter(tags::tag_id.eq_any(&tag_ids))
            .select(tags::tag_id)
            .load::<String>(conn)
            .await?;
        check_tags(&tag_ids, &resolved)?;
    }

    if !update.picture_ids.is_empty() {
        let owned = account_pictures::table
            .filter(account_pictures::account_id.eq(&account.account_id))
            .filter(account_pictures::picture_id.eq_any(&update.picture_ids))
            .select(account_pictures::picture_id)
            .load::<String>(conn)
            .await?
            .into_iter()
            .collect::<HashSet<_>>();
        check_pictures(&update.picture_ids, &owned)?;
    }

    let links = tag_ids
        .iter()
        .map(|tag_id| ClubTag {
            club_id: club_id.to_string(),
            tag_id: tag_id.to_string(),
        })
        .collect::<Vec<_>>();

    conn.transaction::<_, ProfileError, _>(|conn| {
        async move {
            let updated = diesel::update(clubs::table.find(club_id))
                .set(ClubEdit::from(update))
                .execute(conn)
                .await?;
            if updated == 0 {
                return Err(ProfileError::ClubNotFound);
            }

            if !update.picture_ids.is_empty() {
                diesel::update(clubs::table.find(club_id))
                    .set(PictureSlotsEdit::assign(&update.picture_ids))
                    .execute(conn)
                    .await?;
            }

            if !links.is_empty() {
                diesel::delete(club_tags::table.filter(club_tags::club_id.eq(club_id)))
                    .execute(conn)
                    .await?;
                diesel::insert_into(club_tags::table)
                    .values(links)
                    .execute(conn)
                    .await?;
            }

            Ok(())
        }
        .scope_boxed()
    })
    .await?;

    tracing::info!(
        club_id,
        account_id = %account.account_id,
        tags = tag_ids.len(),
        pictures = update.picture_ids.len(),
        "club profile updated"
    );
    Ok(())
}
