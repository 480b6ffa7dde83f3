//! Caller identity: JWT claims and the actor they resolve to

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Role carried by an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    CompanyAdmin,
    Staff,
}

/// JWT Claims for authenticated callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub staff_member_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

/// The party acting on an appointment, resolved once from the claims
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Client { id: Uuid },
    Company { company_id: Uuid },
    Staff { staff_member_id: Uuid },
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn actor(&self) -> Result<Actor, AppError> {
        match self.role {
            Role::Client => Ok(Actor::Client { id: self.user_id }),
            Role::CompanyAdmin => self
                .company_id
                .map(|company_id| Actor::Company { company_id })
                .ok_or_else(|| {
                    AppError::Authentication("Company token without company id".to_string())
                }),
            Role::Staff => self
                .staff_member_id
                .map(|staff_member_id| Actor::Staff { staff_member_id })
                .ok_or_else(|| {
                    AppError::Authentication("Staff token without staff member id".to_string())
                }),
        }
    }

    /// Only clients may book
    pub fn require_client(&self) -> Result<Uuid, AppError> {
        match self.actor()? {
            Actor::Client { id } => Ok(id),
            _ => Err(AppError::Authorization("Only clients can book appointments".to_string())),
        }
    }
}
