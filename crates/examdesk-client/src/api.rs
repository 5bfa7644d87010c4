//! REST endpoint bindings with refresh-and-replay on denied requests.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{instrument, warn};

use examdesk_core::error::ClientError;
use examdesk_core::invite::Invite;
use examdesk_core::model::{
    ClassInfo, ClassMembership, CreatedExam, Exam, Member, MemberProfile, MemberRole, NewClass, NewExam,
    Submission, SubmissionRequest, SubmissionResult, User,
};
use examdesk_core::statistics::{ClassStats, SubmissionReview};
use examdesk_core::traits::CredentialStore;
use examdesk_core::validation::{CreateClassForm, FieldError, SignUpForm, ValidationErrors};

use crate::config::{create_credential_store, ClientConfig};
use crate::session::{RouteKind, SessionManager};
use crate::transport::{is_credential_endpoint, to_body, HttpBackend};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinClassBody<'a> {
    class_id: &'a str,
}

/// Client for the exam backend.
///
/// Authorized requests that come back denied (HTTP 401/403) trigger a token
/// refresh and are replayed, up to `max_auth_retries` refreshes per call.
pub struct ApiClient {
    manager: SessionManager<HttpBackend>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ClientError> {
        let backend = HttpBackend::from_config(config)?;
        Ok(Self {
            manager: SessionManager::new(backend, store)
                .with_max_auth_retries(config.max_auth_retries),
        })
    }

    /// Build a client with the credential store the configuration names.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config, create_credential_store(config))
    }

    pub fn manager(&self) -> &SessionManager<HttpBackend> {
        &self.manager
    }

    /// Send an authorized request, refreshing and replaying on denial.
    #[instrument(skip(self, query, body))]
    async fn authorized<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let backend = self.manager.backend();
        let body = body.as_ref();
        if is_credential_endpoint(path) {
            let token = self.manager.session().access_token();
            return backend.send(method, path, query, body, token.as_deref()).await;
        }
        self.manager
            .with_refresh(move |token| {
                let method = method.clone();
                async move { backend.send(method, path, query, body, token.as_deref()).await }
            })
            .await
    }

    // -- session ----------------------------------------------------------

    pub async fn sign_up(&self, form: SignUpForm) -> Result<(), ClientError> {
        self.manager.sign_up(form).await
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<User, ClientError> {
        self.manager.sign_in(username, password).await
    }

    pub async fn sign_out(&self) {
        self.manager.sign_out().await
    }

    /// Restore the session from the stored credential, as a protected page would.
    pub async fn bootstrap(&self) {
        self.manager.bootstrap(RouteKind::Protected).await
    }

    /// The signed-in user, restoring the session first if needed.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        if let Some(user) = self.manager.session().user() {
            return Ok(user);
        }
        if self.manager.session().access_token().is_none() {
            self.manager.refresh().await?;
        }
        match self.manager.session().user() {
            Some(user) => Ok(user),
            None => self.manager.fetch_profile().await,
        }
    }

    pub async fn my_classes(&self) -> Result<Vec<ClassMembership>, ClientError> {
        if self.manager.session().access_token().is_none() {
            self.manager.refresh().await?;
        }
        self.manager.fetch_classes().await
    }

    // -- classes ----------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn class_info(&self, class_id: &str) -> Result<ClassInfo, ClientError> {
        self.authorized(Method::GET, "class/getclassinfo", &[("id", class_id)], None)
            .await
    }

    #[instrument(skip(self, member), fields(user_id = %member.user_id))]
    pub async fn member_profile(&self, member: &Member) -> Result<MemberProfile, ClientError> {
        let role = match member.role {
            MemberRole::Leader => "leader",
            MemberRole::Member => "member",
            MemberRole::Unknown => "",
        };
        let joined_at = member.joined_at.as_deref().unwrap_or_default();
        self.authorized(
            Method::GET,
            "me/getUserInfo",
            &[("id", &member.user_id), ("role", role), ("joinedAt", joined_at)],
            None,
        )
        .await
    }

    /// Class members with their profiles, fetched concurrently. A member
    /// whose profile cannot be loaded is listed without one.
    pub async fn class_members(
        &self,
        info: &ClassInfo,
    ) -> Vec<(Member, Option<MemberProfile>)> {
        let lookups = info.members.iter().map(|m| self.member_profile(m));
        let profiles = futures::future::join_all(lookups).await;
        info.members
            .iter()
            .cloned()
            .zip(profiles)
            .map(|(member, profile)| {
                let profile = profile
                    .inspect_err(|e| warn!(user_id = %member.user_id, error = %e, "member lookup failed"))
                    .ok();
                (member, profile)
            })
            .collect()
    }

    #[instrument(skip_all, fields(name = %form.name))]
    pub async fn create_class(&self, form: &CreateClassForm) -> Result<(), ClientError> {
        form.validate()?;
        let class = NewClass {
            name: form.name.trim().to_string(),
            description: form.description.trim().to_string(),
            // 0 means no limit and is sent as null
            max_mem: Some(form.max_members).filter(|&m| m > 0),
        };
        let _: serde_json::Value = self
            .authorized(Method::POST, "class/createclass", &[], Some(to_body(&class)?))
            .await?;
        self.manager.session().invalidate_classes();
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn join_class(&self, class_id: &str) -> Result<(), ClientError> {
        let body = to_body(&JoinClassBody { class_id })?;
        let _: serde_json::Value = self
            .authorized(Method::POST, "class/joinclass", &[], Some(body))
            .await?;
        self.manager.session().invalidate_classes();
        Ok(())
    }

    /// Look up an invite for the signed-in user.
    pub async fn resolve_invite(&self, class_id: &str) -> Result<Invite, ClientError> {
        let user = self.current_user().await?;
        let info = self.class_info(class_id).await?;
        Ok(Invite::resolve(class_id, &info, &user.id))
    }

    /// Join through an invite. A used invite is refused without a request.
    pub async fn accept_invite(&self, invite: Invite) -> Result<Invite, ClientError> {
        if !invite.can_join() {
            return Err(ValidationErrors::from(vec![FieldError::new(
                "classId",
                "you are already a member of this class",
            )])
            .into());
        }
        self.join_class(&invite.class_id).await?;
        Ok(invite.accepted())
    }

    // -- exams ------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn class_exams(&self, class_id: &str) -> Result<Vec<Exam>, ClientError> {
        let exams: Option<Vec<Exam>> = self
            .authorized(Method::GET, "class/getexams", &[("id", class_id)], None)
            .await?;
        Ok(exams.unwrap_or_default())
    }

    #[instrument(skip_all, fields(title = %exam.title))]
    pub async fn create_exam(&self, exam: &NewExam) -> Result<CreatedExam, ClientError> {
        let created: Option<CreatedExam> = self
            .authorized(Method::POST, "exam/createexam", &[], Some(to_body(exam)?))
            .await?;
        Ok(created.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn exam(&self, exam_id: &str) -> Result<Exam, ClientError> {
        self.authorized(Method::GET, "exam/info", &[("id", exam_id)], None)
            .await
    }

    #[instrument(skip_all, fields(exam_id = %request.exam_id))]
    pub async fn submit_exam(
        &self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionResult, ClientError> {
        self.authorized(Method::POST, "exam/submitexam", &[], Some(to_body(request)?))
            .await
    }

    // -- submissions ------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn exam_submissions(&self, exam_id: &str) -> Result<Vec<Submission>, ClientError> {
        let submissions: Option<Vec<Submission>> = self
            .authorized(
                Method::GET,
                "exam/getexamsubmissions",
                &[("examId", exam_id)],
                None,
            )
            .await?;
        Ok(submissions.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn class_submissions(
        &self,
        class_id: &str,
    ) -> Result<Vec<Submission>, ClientError> {
        let submissions: Option<Vec<Submission>> = self
            .authorized(
                Method::GET,
                "exam/getclasssubmissions",
                &[("classId", class_id)],
                None,
            )
            .await?;
        Ok(submissions.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn submission(&self, submission_id: &str) -> Result<Submission, ClientError> {
        self.authorized(
            Method::GET,
            "exam/getsubmission",
            &[("id", submission_id)],
            None,
        )
        .await
    }

    pub async fn class_stats(&self, class_id: &str) -> Result<ClassStats, ClientError> {
        let submissions = self.class_submissions(class_id).await?;
        Ok(ClassStats::from_submissions(&submissions))
    }

    /// A submission checked question by question against its exam.
    pub async fn review_submission(
        &self,
        submission_id: &str,
    ) -> Result<SubmissionReview, ClientError> {
        let submission = self.submission(submission_id).await?;
        let exam = self.exam(&submission.exam_id).await?;
        Ok(SubmissionReview::build(&exam, &submission))
    }
}
