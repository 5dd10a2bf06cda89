use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Employers post jobs, employees search them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Employer,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "Employer",
            Role::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Employer" => Ok(Role::Employer),
            "Employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String, // SHA-256 hex digest, compared for equality only
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: i64,
    pub company: String,
    pub role_title: String,
    pub experience_years_required: u32,
    pub mini_projects_required: u32,
    pub major_projects_required: u32,
    pub package: String, // currency unit implied by caller, e.g. LPA
    pub deadline: NaiveDate,
    pub posted_by: String,
}

impl JobPosting {
    /// A posting is open while its deadline has not passed. Derived, never
    /// stored; closed postings still show up in eligibility matches.
    pub fn is_open_on(&self, today: NaiveDate) -> bool {
        self.deadline >= today
    }

    pub fn is_open(&self) -> bool {
        self.is_open_on(Local::now().date_naive())
    }
}

/// Fields an employer supplies when posting a job. The id is generated and
/// `posted_by` comes from the authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPosting {
    pub company: String,
    pub role_title: String,
    pub experience_years_required: u32,
    pub mini_projects_required: u32,
    pub major_projects_required: u32,
    pub package: String,
    pub deadline: NaiveDate,
    pub posted_by: String,
}

/// What a seeker brings to the table when searching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeekerProfile {
    pub experience: u32,
    pub mini_done: u32,
    pub major_done: u32,
}
