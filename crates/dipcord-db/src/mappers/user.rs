//! User entity <-> model mapper

use dipcord_core::{Snowflake, User};

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            name: model.name,
            surname: model.surname,
            email: model.email,
            roles: model.roles,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
