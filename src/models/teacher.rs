//! Teaching staff, with server-generated teacher codes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require, unique_key, Resource};

/// Prefix of generated teacher codes.
pub const TEACHER_CODE_PREFIX: &str = "TCH";

/// Digits the numeric part of a teacher code is padded to.
const TEACHER_CODE_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Assigned by the server on create, e.g. `TCH0007`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_code: Option<String>,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<NaiveDate>,
}

impl Resource for Teacher {
    const KIND: &'static str = "teachers";
    const LABEL: &'static str = "Teacher";

    fn validate(&self) -> Result<(), String> {
        require("Teacher name", &self.name)?;
        if !is_email(self.email.trim()) {
            return Err(format!("Invalid email address {:?}", self.email));
        }
        require("Username", &self.username)?;
        if self.username.trim().chars().any(char::is_whitespace) {
            return Err("Username must not contain spaces".to_string());
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("email", self.email.trim().to_lowercase()),
            unique_key("username", &self.username),
        ]
    }

    fn assign_generated(&mut self, previous: Option<&Self>) {
        let last = previous.and_then(|t| t.teacher_code.as_deref());
        self.teacher_code = Some(next_teacher_code(last));
    }

    fn carry_generated(&mut self, existing: &Self) {
        self.teacher_code = existing.teacher_code.clone();
    }
}

/// Compute the code following `last`, restarting at 1 when `last` is absent
/// or carries no numeric suffix.
pub fn next_teacher_code(last: Option<&str>) -> String {
    let next = last
        .and_then(|code| {
            let digits: String = code
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            digits.parse::<u64>().ok()
        })
        .map_or(1, |n| n.saturating_add(1));

    format!(
        "{}{:0width$}",
        TEACHER_CODE_PREFIX,
        next,
        width = TEACHER_CODE_WIDTH
    )
}

fn is_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
