//! Board domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::pin::PinType;

/// Scope of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardType {
    National,
    State,
    City,
    Social,
}

impl BoardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardType::National => "NATIONAL",
            BoardType::State => "STATE",
            BoardType::City => "CITY",
            BoardType::Social => "SOCIAL",
        }
    }

    /// Kind of pin placed on a board of this type.
    ///
    /// Social boards are paid with social pins, every other scope with pin packs.
    pub fn pin_type(&self) -> PinType {
        match self {
            BoardType::Social => PinType::Social,
            BoardType::National | BoardType::State | BoardType::City => PinType::Regular,
        }
    }
}

impl FromStr for BoardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NATIONAL" => Ok(BoardType::National),
            "STATE" => Ok(BoardType::State),
            "CITY" => Ok(BoardType::City),
            "SOCIAL" => Ok(BoardType::Social),
            _ => Err(format!("Invalid board type: {}", s)),
        }
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A board posts are published to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub board_type: BoardType,
    pub state: Option<String>,
    pub city: Option<String>,
    pub social_owner_id: Option<Uuid>,
    pub is_approved: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Whether `user_id` may post or pin here. Social boards are owner-only.
    pub fn is_open_to(&self, user_id: Uuid) -> bool {
        self.board_type != BoardType::Social || self.social_owner_id == Some(user_id)
    }
}

/// Request payload for creating a state or city board.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub board_type: BoardType,

    #[validate(custom(function = "shared::validation::validate_state_code"))]
    pub state: Option<String>,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: Option<String>,
}

impl CreateBoardRequest {
    /// Checks that the location fields match the board scope.
    ///
    /// National and social boards cannot be created through the API.
    pub fn validate_scope(&self) -> Result<(), String> {
        match self.board_type {
            BoardType::National => Err("The national board already exists".to_string()),
            BoardType::Social => {
                Err("Social boards are created automatically at registration".to_string())
            }
            BoardType::State => {
                if self.state.is_none() {
                    return Err("State boards require a state".to_string());
                }
                if self.city.is_some() {
                    return Err("State boards cannot have a city".to_string());
                }
                Ok(())
            }
            BoardType::City => {
                if self.state.is_none() || self.city.is_none() {
                    return Err("City boards require a state and a city".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Query parameters for listing boards.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBoardsQuery {
    #[serde(rename = "type")]
    pub board_type: Option<BoardType>,
    pub state: Option<String>,
    pub city: Option<String>,
}

/// Name given to the board created for every new account.
pub fn social_board_name(display_name: &str) -> String {
    format!("{}'s Social Board", display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(board_type: BoardType, state: Option<&str>, city: Option<&str>) -> CreateBoardRequest {
        CreateBoardRequest {
            name: "Local".to_string(),
            description: None,
            board_type,
            state: state.map(String::from),
            city: city.map(String::from),
        }
    }

    fn board(board_type: BoardType, social_owner_id: Option<Uuid>) -> Board {
        Board {
            id: Uuid::new_v4(),
            name: "Board".to_string(),
            description: None,
            board_type,
            state: None,
            city: None,
            social_owner_id,
            is_approved: true,
            created_by: social_owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_social_board_open_only_to_owner() {
        let owner = Uuid::new_v4();
        let social = board(BoardType::Social, Some(owner));

        assert!(social.is_open_to(owner));
        assert!(!social.is_open_to(Uuid::new_v4()));
    }

    #[test]
    fn test_location_boards_open_to_everyone() {
        for board_type in [BoardType::National, BoardType::State, BoardType::City] {
            assert!(board(board_type, None).is_open_to(Uuid::new_v4()));
        }
    }

    #[test]
    fn test_board_type_roundtrip() {
        for board_type in [
            BoardType::National,
            BoardType::State,
            BoardType::City,
            BoardType::Social,
        ] {
            assert_eq!(BoardType::from_str(board_type.as_str()).unwrap(), board_type);
        }
        assert_eq!(BoardType::from_str("city").unwrap(), BoardType::City);
        assert!(BoardType::from_str("county").is_err());
    }

    #[test]
    fn test_board_type_serialization() {
        assert_eq!(
            serde_json::to_string(&BoardType::Social).unwrap(),
            "\"SOCIAL\""
        );
        let parsed: BoardType = serde_json::from_str("\"NATIONAL\"").unwrap();
        assert_eq!(parsed, BoardType::National);
    }

    #[test]
    fn test_pin_type_follows_board_type() {
        assert_eq!(BoardType::Social.pin_type(), PinType::Social);
        assert_eq!(BoardType::National.pin_type(), PinType::Regular);
        assert_eq!(BoardType::State.pin_type(), PinType::Regular);
        assert_eq!(BoardType::City.pin_type(), PinType::Regular);
    }

    #[test]
    fn test_validate_scope() {
        assert!(request(BoardType::State, Some("CA"), None).validate_scope().is_ok());
        assert!(request(BoardType::State, None, None).validate_scope().is_err());
        assert!(request(BoardType::State, Some("CA"), Some("Fresno"))
            .validate_scope()
            .is_err());
        assert!(request(BoardType::City, Some("CA"), Some("Fresno"))
            .validate_scope()
            .is_ok());
        assert!(request(BoardType::City, None, Some("Fresno"))
            .validate_scope()
            .is_err());
        assert!(request(BoardType::National, None, None).validate_scope().is_err());
        assert!(request(BoardType::Social, None, None).validate_scope().is_err());
    }

    #[test]
    fn test_state_code_validated() {
        assert!(request(BoardType::State, Some("California"), None)
            .validate()
            .is_err());
    }

    #[test]
    fn test_social_board_name() {
        assert_eq!(social_board_name("Ada"), "Ada's Social Board");
    }
}
