//! Typed requests for each worker task, and their argv encoding.
//!
//! Every task the worker exposes on its command line has a variant here.
//! [`WorkerRequest::to_args`] produces the exact flag vector the worker's
//! own flag parser expects; [`WorkerRequest::validate`] applies the same
//! field rules the worker enforces, so an invalid request is rejected
//! before any process is spawned.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0[0-9]{9}$").unwrap());
// Shape only; calendar correctness is the worker's concern.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

const TITLE_MAX: usize = 64;
const DESCRIPTION_MAX: usize = 1024;
const SALARY_MAX: i64 = 1_000_000;

/// A request rejected before the worker was invoked.
///
/// Messages follow the worker's own vocabulary so console output reads
/// the same whichever side caught the problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("Missing user email")]
    MissingEmail,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Missing user {which} name")]
    MissingName { which: &'static str },

    #[error("Invalid {which} name")]
    InvalidName { which: &'static str },

    #[error("Missing user phone number")]
    MissingPhone,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Invalid education level")]
    InvalidEducation,

    #[error("Invalid posted date, expected YYYY-MM-DD")]
    InvalidPostedDate,

    #[error("Missing job id")]
    MissingJobId,

    #[error("Missing job title")]
    MissingTitle,

    #[error("Job title too long ({TITLE_MAX} characters max)")]
    TitleTooLong,

    #[error("Missing job description")]
    MissingDescription,

    #[error("Job description too long ({DESCRIPTION_MAX} characters max)")]
    DescriptionTooLong,

    #[error("Invalid experience level")]
    InvalidExperience,

    #[error("Invalid salary")]
    InvalidSalary,
}

fn validate_email(email: &str) -> Result<(), ValidateError> {
    if email.is_empty() {
        return Err(ValidateError::MissingEmail);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidateError::InvalidEmail);
    }
    Ok(())
}

fn validate_name(name: &str, which: &'static str) -> Result<(), ValidateError> {
    if name.is_empty() {
        return Err(ValidateError::MissingName { which });
    }
    if !NAME_RE.is_match(name) {
        return Err(ValidateError::InvalidName { which });
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ValidateError> {
    if phone.is_empty() {
        return Err(ValidateError::MissingPhone);
    }
    if !PHONE_RE.is_match(phone) {
        return Err(ValidateError::InvalidPhone);
    }
    Ok(())
}

fn validate_education(level: i64) -> Result<(), ValidateError> {
    if !(0..=4).contains(&level) {
        return Err(ValidateError::InvalidEducation);
    }
    Ok(())
}

fn validate_experience(years: i64) -> Result<(), ValidateError> {
    if years < 0 {
        return Err(ValidateError::InvalidExperience);
    }
    Ok(())
}

fn validate_salary(salary: i64) -> Result<(), ValidateError> {
    if !(0..=SALARY_MAX).contains(&salary) {
        return Err(ValidateError::InvalidSalary);
    }
    Ok(())
}

fn validate_posted_date(date: &str) -> Result<(), ValidateError> {
    if !DATE_RE.is_match(date) {
        return Err(ValidateError::InvalidPostedDate);
    }
    Ok(())
}

fn validate_job_id(job_id: &str) -> Result<(), ValidateError> {
    if job_id.is_empty() {
        return Err(ValidateError::MissingJobId);
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), ValidateError> {
    if title.is_empty() {
        return Err(ValidateError::MissingTitle);
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ValidateError::TitleTooLong);
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidateError> {
    if description.is_empty() {
        return Err(ValidateError::MissingDescription);
    }
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(ValidateError::DescriptionTooLong);
    }
    Ok(())
}

/// Fields for the `register` task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUser {
    pub email: String,
    pub first: String,
    pub last: String,
    pub phone: String,
    pub education: i64,
}

/// Fields for the `create` task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub creator: String,
    pub title: String,
    pub description: String,
    pub min_education: i64,
    pub min_experience: i64,
    pub salary: i64,
}

/// Filter for the `search` task. Only the requesting email is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub email: String,
    pub posted: Option<String>,
    pub min_education: Option<i64>,
    pub min_experience: Option<i64>,
    pub salary: Option<i64>,
    pub keyword: Option<String>,
}

impl SearchCriteria {
    /// A search with no filters beyond the requesting user.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            posted: None,
            min_education: None,
            min_experience: None,
            salary: None,
            keyword: None,
        }
    }

    /// Only jobs posted on or after this date (YYYY-MM-DD).
    pub fn posted(mut self, date: impl Into<String>) -> Self {
        self.posted = Some(date.into());
        self
    }

    /// Only jobs requiring at most this education level (0..=4).
    pub fn min_education(mut self, level: i64) -> Self {
        self.min_education = Some(level);
        self
    }

    /// Only jobs asking at most this many years of experience.
    pub fn min_experience(mut self, years: i64) -> Self {
        self.min_experience = Some(years);
        self
    }

    /// Only jobs offering at least this monthly salary.
    pub fn salary(mut self, amount: i64) -> Self {
        self.salary = Some(amount);
        self
    }

    /// Only jobs whose title matches this keyword.
    pub fn keyword(mut self, word: impl Into<String>) -> Self {
        self.keyword = Some(word.into());
        self
    }
}

/// Changed fields for the `modify` task; `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub creator: String,
    pub job_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub min_education: Option<i64>,
    pub min_experience: Option<i64>,
    pub salary: Option<i64>,
    pub is_open: Option<bool>,
}

impl JobUpdate {
    /// An update that changes nothing yet.
    pub fn new(creator: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
            job_id: job_id.into(),
            title: None,
            description: None,
            min_education: None,
            min_experience: None,
            salary: None,
            is_open: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn min_education(mut self, level: i64) -> Self {
        self.min_education = Some(level);
        self
    }

    pub fn min_experience(mut self, years: i64) -> Self {
        self.min_experience = Some(years);
        self
    }

    pub fn salary(mut self, amount: i64) -> Self {
        self.salary = Some(amount);
        self
    }

    pub fn is_open(mut self, open: bool) -> Self {
        self.is_open = Some(open);
        self
    }
}

/// One request to the worker: a task name plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerRequest {
    Register(RegisterUser),
    Create(NewJob),
    Search(SearchCriteria),
    Detail { email: String, job_id: String },
    Offered { creator: String },
    Applied { email: String },
    Modify(JobUpdate),
    Submit { email: String, job_id: String },
    Candidates { creator: String, job_id: String },
}

impl WorkerRequest {
    /// The worker's name for this task.
    pub fn task(&self) -> &'static str {
        match self {
            WorkerRequest::Register(_) => "register",
            WorkerRequest::Create(_) => "create",
            WorkerRequest::Search(_) => "search",
            WorkerRequest::Detail { .. } => "detail",
            WorkerRequest::Offered { .. } => "offered",
            WorkerRequest::Applied { .. } => "applied",
            WorkerRequest::Modify(_) => "modify",
            WorkerRequest::Submit { .. } => "submit",
            WorkerRequest::Candidates { .. } => "candidates",
        }
    }

    /// Check the request against the worker's field rules.
    pub fn validate(&self) -> Result<(), ValidateError> {
        match self {
            WorkerRequest::Register(user) => {
                validate_email(&user.email)?;
                validate_name(&user.first, "first")?;
                validate_name(&user.last, "last")?;
                validate_phone(&user.phone)?;
                validate_education(user.education)
            }
            WorkerRequest::Create(job) => {
                validate_email(&job.creator)?;
                validate_title(&job.title)?;
                validate_description(&job.description)?;
                validate_education(job.min_education)?;
                validate_experience(job.min_experience)?;
                validate_salary(job.salary)
            }
            WorkerRequest::Search(criteria) => {
                validate_email(&criteria.email)?;
                if let Some(posted) = &criteria.posted {
                    validate_posted_date(posted)?;
                }
                if let Some(level) = criteria.min_education {
                    validate_education(level)?;
                }
                if let Some(years) = criteria.min_experience {
                    validate_experience(years)?;
                }
                if let Some(amount) = criteria.salary {
                    validate_salary(amount)?;
                }
                Ok(())
            }
            WorkerRequest::Detail { email, job_id } => {
                validate_email(email)?;
                validate_job_id(job_id)
            }
            WorkerRequest::Offered { creator } => validate_email(creator),
            WorkerRequest::Applied { email } => validate_email(email),
            WorkerRequest::Modify(update) => {
                validate_email(&update.creator)?;
                validate_job_id(&update.job_id)?;
                if let Some(title) = &update.title {
                    validate_title(title)?;
                }
                if let Some(description) = &update.description {
                    validate_description(description)?;
                }
                if let Some(level) = update.min_education {
                    validate_education(level)?;
                }
                if let Some(years) = update.min_experience {
                    validate_experience(years)?;
                }
                if let Some(amount) = update.salary {
                    validate_salary(amount)?;
                }
                Ok(())
            }
            WorkerRequest::Submit { email, job_id } => {
                validate_email(email)?;
                validate_job_id(job_id)
            }
            WorkerRequest::Candidates { creator, job_id } => {
                validate_email(creator)?;
                validate_job_id(job_id)
            }
        }
    }

    /// Encode the request as the worker's argument vector.
    ///
    /// Arguments stay discrete strings end to end; nothing here is ever
    /// joined into a shell command. Emails are compared lowercased by the
    /// worker, so they are normalized the same way here.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-task".to_owned(), self.task().to_owned()];

        let mut flag = |name: &str, value: String| {
            args.push(name.to_owned());
            args.push(value);
        };

        match self {
            WorkerRequest::Register(user) => {
                flag("-email", user.email.to_lowercase());
                flag("-first", user.first.clone());
                flag("-last", user.last.clone());
                flag("-phone", user.phone.clone());
                flag("-education", user.education.to_string());
            }
            WorkerRequest::Create(job) => {
                flag("-creator", job.creator.to_lowercase());
                flag("-title", job.title.clone());
                flag("-description", job.description.clone());
                flag("-min_education", job.min_education.to_string());
                flag("-min_experience", job.min_experience.to_string());
                flag("-salary", job.salary.to_string());
            }
            WorkerRequest::Search(criteria) => {
                flag("-email", criteria.email.to_lowercase());
                if let Some(posted) = &criteria.posted {
                    flag("-posted", posted.clone());
                }
                if let Some(level) = criteria.min_education {
                    flag("-min_education", level.to_string());
                }
                if let Some(years) = criteria.min_experience {
                    flag("-min_experience", years.to_string());
                }
                if let Some(amount) = criteria.salary {
                    flag("-salary", amount.to_string());
                }
                if let Some(word) = &criteria.keyword {
                    flag("-keyword", word.clone());
                }
            }
            WorkerRequest::Detail { email, job_id } => {
                flag("-email", email.to_lowercase());
                flag("-job_id", job_id.clone());
            }
            WorkerRequest::Offered { creator } => {
                flag("-creator", creator.to_lowercase());
            }
            WorkerRequest::Applied { email } => {
                flag("-email", email.to_lowercase());
            }
            WorkerRequest::Modify(update) => {
                flag("-creator", update.creator.to_lowercase());
                flag("-job_id", update.job_id.clone());
                if let Some(title) = &update.title {
                    flag("-title", title.clone());
                }
                if let Some(description) = &update.description {
                    flag("-description", description.clone());
                }
                if let Some(level) = update.min_education {
                    flag("-min_education", level.to_string());
                }
                if let Some(years) = update.min_experience {
                    flag("-min_experience", years.to_string());
                }
                if let Some(amount) = update.salary {
                    flag("-salary", amount.to_string());
                }
                if let Some(open) = update.is_open {
                    flag("-is_open", open.to_string());
                }
            }
            WorkerRequest::Submit { email, job_id } => {
                flag("-email", email.to_lowercase());
                flag("-job_id", job_id.clone());
            }
            WorkerRequest::Candidates { creator, job_id } => {
                flag("-creator", creator.to_lowercase());
                flag("-job_id", job_id.clone());
            }
        }

        args
    }
}
