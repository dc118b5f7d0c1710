use crate::schema::*;
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Number of picture slots on a club profile. Slot 1 is the cover image.
pub const PICTURE_SLOTS: usize = 6;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(primary_key(account_id))]
pub struct Account {
    pub account_id: String,
    pub auth_hash: String,
    pub club_id: Option<String>,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(primary_key(club_id))]
pub struct Club {
    pub club_id: String,
    pub name: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub group_link: Option<String>,
    pub video_link: Option<String>,
    pub description: Option<String>,
    pub published: bool,
    pub pic1_id: Option<String>,
    pub pic2_id: Option<String>,
    pub pic3_id: Option<String>,
    pub pic4_id: Option<String>,
    pub pic5_id: Option<String>,
    pub pic6_id: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Club {
    pub fn picture_slots(&self) -> [Option<&str>; PICTURE_SLOTS] {
        [
            self.pic1_id.as_deref(),
            self.pic2_id.as_deref(),
            self.pic3_id.as_deref(),
            self.pic4_id.as_deref(),
            self.pic5_id.as_deref(),
            self.pic6_id.as_deref(),
        ]
    }
}

#[derive(Debug, Clone, Queryable, Identifiable, Insertable)]
#[diesel(primary_key(tag_id))]
pub struct Tag {
    pub tag_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Insertable)]
#[diesel(belongs_to(Club))]
#[diesel(belongs_to(Tag))]
#[diesel(primary_key(club_id, tag_id))]
#[diesel(table_name = club_tags)]
pub struct ClubTag {
    pub club_id: String,
    pub tag_id: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(primary_key(picture_id))]
pub struct AccountPicture {
    pub picture_id: String,
    pub account_id: String,
    pub file_name: String,
    pub created_at: NaiveDateTime,
}
