use serde::Serialize;

use crate::auth::repo_types::{Account, User};

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub providers: Vec<String>, // linked OAuth providers
}

impl PublicUser {
    pub fn new(user: User, accounts: Vec<Account>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            image: user.image,
            providers: accounts.into_iter().map(|a| a.provider).collect(),
        }
    }
}
