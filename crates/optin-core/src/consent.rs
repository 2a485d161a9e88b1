//! Consent Records
//!
//! Server-side model of an SMS opt-in submission. A record merges the
//! client-supplied fields with server-derived audit fields (source IP,
//! receipt timestamp, consent-confirmation timestamp). Records are
//! append-only: once persisted they are never mutated or deleted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::validate::{is_valid_e164, is_valid_email, is_valid_name};

/// The four consent checkboxes of the structured opt-in form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentFlags {
    /// Express written consent to receive SMS messages
    pub sms_messaging: bool,

    /// Consent to processing and storage of communications
    pub processing_storage: bool,

    /// Acknowledgment of SMS disclosures (frequency, rates, STOP/HELP)
    pub sms_disclosures: bool,

    /// Acknowledgment of terms of service and privacy policy
    pub terms_privacy: bool,
}

impl ConsentFlags {
    /// All four flags granted
    pub fn all_granted(&self) -> bool {
        self.sms_messaging && self.processing_storage && self.sms_disclosures && self.terms_privacy
    }

    /// Validation messages for exactly the flags that are missing, in
    /// form order
    pub fn missing(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if !self.sms_messaging {
            messages.push("SMS messaging consent is required".to_string());
        }
        if !self.processing_storage {
            messages.push("Processing and storage consent is required".to_string());
        }
        if !self.sms_disclosures {
            messages.push("SMS disclosures acknowledgment is required".to_string());
        }
        if !self.terms_privacy {
            messages.push("Terms and privacy acknowledgment is required".to_string());
        }
        messages
    }
}

/// Consent evidence attached to a submission
///
/// Two shapes are accepted on the wire: the original single
/// version-plus-shown-copy pair, and the structured four-checkbox state
/// with a consent-text version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Consent {
    Structured {
        consents: ConsentFlags,
        #[serde(rename = "consentTextVersion")]
        text_version: String,
    },
    Versioned {
        #[serde(rename = "consentVersion")]
        version: String,
        #[serde(rename = "webFormShownCopy")]
        shown_copy: String,
    },
}

impl Consent {
    /// Whether this evidence is complete enough to persist as an opt-in
    pub fn is_complete(&self) -> bool {
        match self {
            Consent::Structured {
                consents,
                text_version,
            } => consents.all_granted() && !text_version.trim().is_empty(),
            Consent::Versioned {
                version,
                shown_copy,
            } => !version.trim().is_empty() && !shown_copy.trim().is_empty(),
        }
    }
}

/// Client-supplied portion of an opt-in submission
///
/// The consent fields are kept raw and optional here so a body missing
/// them still deserializes; the absence becomes a validation message
/// instead of a parse failure.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptInSubmission {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "phoneE164")]
    pub phone_e164: String,

    #[serde(default)]
    pub email: Option<String>,

    /// IANA timezone identifier reported by the client
    #[serde(default)]
    pub tz_iana: String,

    #[serde(default)]
    pub user_agent: String,

    #[serde(default)]
    pub referer: String,

    /// Version-plus-copy consent shape
    #[serde(default)]
    pub consent_version: Option<String>,

    #[serde(default)]
    pub web_form_shown_copy: Option<String>,

    /// Structured four-checkbox consent shape
    #[serde(default)]
    pub consents: Option<ConsentFlags>,

    #[serde(default)]
    pub consent_text_version: Option<String>,

    /// Client clock at submission, echoed through to the record
    #[serde(default)]
    pub submitted_at_utc_iso: String,
}

impl OptInSubmission {
    /// Consent evidence carried by this submission, or `None` when the
    /// body supplied neither shape. Structured checkboxes win when both
    /// are present.
    pub fn consent(&self) -> Option<Consent> {
        if let Some(consents) = self.consents {
            return Some(Consent::Structured {
                consents,
                text_version: self.consent_text_version.clone().unwrap_or_default(),
            });
        }
        match (&self.consent_version, &self.web_form_shown_copy) {
            (None, None) => None,
            (version, shown_copy) => Some(Consent::Versioned {
                version: version.clone().unwrap_or_default(),
                shown_copy: shown_copy.clone().unwrap_or_default(),
            }),
        }
    }

    /// Run every validator and collect the failures in form order.
    /// Empty result means the submission may be persisted.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !is_valid_name(&self.name) {
            errors.push("Name must be at least 2 characters".to_string());
        }

        if !is_valid_e164(self.phone_e164.trim()) {
            errors.push("Phone must be in valid E.164 format".to_string());
        }

        if let Some(email) = &self.email {
            if !email.trim().is_empty() && !is_valid_email(email.trim()) {
                errors.push("Email must be valid if provided".to_string());
            }
        }

        match self.consent() {
            None => errors.push("Consent version and copy are required".to_string()),
            Some(Consent::Versioned {
                version,
                shown_copy,
            }) => {
                if version.trim().is_empty() || shown_copy.trim().is_empty() {
                    errors.push("Consent version and copy are required".to_string());
                }
            }
            Some(Consent::Structured {
                consents,
                text_version,
            }) => {
                errors.extend(consents.missing());
                if text_version.trim().is_empty() {
                    errors.push("Consent text version is required".to_string());
                }
            }
        }

        errors
    }
}

/// Complete server-side consent record
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub name: String,

    #[serde(rename = "phoneE164")]
    pub phone_e164: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub tz_iana: String,
    pub user_agent: String,
    pub referer: String,

    #[serde(flatten)]
    pub consent: Consent,

    pub submitted_at_utc_iso: String,

    /// Source IP derived from transport headers, never the request body
    pub ip: String,

    /// Server receipt time
    pub received_at_utc_iso: DateTime<Utc>,

    /// Moment the server confirmed all four structured flags were true.
    /// Absent for version-plus-copy submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_confirmed_at_utc_iso: Option<DateTime<Utc>>,

    /// Outcome of the best-effort welcome notification, if one was
    /// attempted after the record was built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message_sent: Option<bool>,
}

impl ConsentRecord {
    /// Build a persistable record from a validated submission.
    ///
    /// Returns `DomainError::Validation` with every failure message when
    /// any check fails; a partially consented submission never becomes a
    /// record.
    pub fn build(submission: OptInSubmission, ip: String, now: DateTime<Utc>) -> Result<Self> {
        let errors = submission.validation_errors();
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        // validation_errors() guarantees consent is present and complete
        let consent = submission.consent().ok_or_else(|| {
            DomainError::Validation(vec!["Consent version and copy are required".to_string()])
        })?;

        let consent_confirmed_at_utc_iso = match &consent {
            Consent::Structured { consents, .. } if consents.all_granted() => Some(now),
            _ => None,
        };

        Ok(Self {
            name: submission.name,
            phone_e164: submission.phone_e164,
            email: submission.email.filter(|e| !e.trim().is_empty()),
            tz_iana: submission.tz_iana,
            user_agent: submission.user_agent,
            referer: submission.referer,
            consent,
            submitted_at_utc_iso: submission.submitted_at_utc_iso,
            ip,
            received_at_utc_iso: now,
            consent_confirmed_at_utc_iso,
            welcome_message_sent: None,
        })
    }

    /// User agent truncated for readable audit log lines
    pub fn user_agent_summary(&self) -> String {
        const MAX: usize = 100;
        if self.user_agent.len() > MAX {
            let cut = self
                .user_agent
                .char_indices()
                .map(|(i, _)| i)
                .take_while(|i| *i <= MAX)
                .last()
                .unwrap_or(0);
            format!("{}...", &self.user_agent[..cut])
        } else {
            self.user_agent.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versioned_submission() -> OptInSubmission {
        OptInSubmission {
            name: "Ada Lovelace".into(),
            phone_e164: "+14155551234".into(),
            email: Some("ada@example.com".into()),
            tz_iana: "America/New_York".into(),
            user_agent: "Mozilla/5.0".into(),
            referer: "https://example.com/opt-in".into(),
            consent_version: Some("v1-2025-09-15".into()),
            web_form_shown_copy: Some("I agree to receive SMS messages".into()),
            submitted_at_utc_iso: "2025-09-15T12:00:00Z".into(),
            ..OptInSubmission::default()
        }
    }

    fn structured_submission(flags: ConsentFlags) -> OptInSubmission {
        OptInSubmission {
            consent_version: None,
            web_form_shown_copy: None,
            consents: Some(flags),
            consent_text_version: Some("v2-2025-10-01".into()),
            ..versioned_submission()
        }
    }

    fn all_flags() -> ConsentFlags {
        ConsentFlags {
            sms_messaging: true,
            processing_storage: true,
            sms_disclosures: true,
            terms_privacy: true,
        }
    }

    #[test]
    fn test_valid_versioned_submission_builds() {
        let record = ConsentRecord::build(versioned_submission(), "203.0.113.9".into(), Utc::now())
            .unwrap();
        assert_eq!(record.ip, "203.0.113.9");
        assert!(record.consent_confirmed_at_utc_iso.is_none());
    }

    #[test]
    fn test_structured_submission_sets_confirmation_timestamp() {
        let submission = structured_submission(all_flags());
        let now = Utc::now();
        let record = ConsentRecord::build(submission, "203.0.113.9".into(), now).unwrap();
        assert_eq!(record.consent_confirmed_at_utc_iso, Some(now));
        assert_eq!(record.received_at_utc_iso, now);
    }

    #[test]
    fn test_partial_consent_never_builds() {
        for unset in 0..4 {
            let mut flags = all_flags();
            match unset {
                0 => flags.sms_messaging = false,
                1 => flags.processing_storage = false,
                2 => flags.sms_disclosures = false,
                _ => flags.terms_privacy = false,
            }
            let submission = structured_submission(flags);
            let err = ConsentRecord::build(submission, "unknown".into(), Utc::now()).unwrap_err();
            assert_eq!(err.details().len(), 1, "exactly the one missing flag");
        }
    }

    #[test]
    fn test_missing_flags_listed_exactly() {
        let flags = ConsentFlags {
            sms_messaging: false,
            processing_storage: true,
            sms_disclosures: false,
            terms_privacy: true,
        };
        let missing = flags.missing();
        assert_eq!(
            missing,
            vec![
                "SMS messaging consent is required".to_string(),
                "SMS disclosures acknowledgment is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_errors_accumulate_in_order() {
        let submission = OptInSubmission {
            name: "A".into(),
            phone_e164: "4155551234".into(),
            email: Some("not-an-email".into()),
            ..OptInSubmission::default()
        };
        let errors = submission.validation_errors();
        assert_eq!(
            errors,
            vec![
                "Name must be at least 2 characters".to_string(),
                "Phone must be in valid E.164 format".to_string(),
                "Email must be valid if provided".to_string(),
                "Consent version and copy are required".to_string(),
            ]
        );
    }

    #[test]
    fn test_absent_email_is_valid() {
        let mut submission = versioned_submission();
        submission.email = None;
        assert!(submission.validation_errors().is_empty());

        submission.email = Some(String::new());
        assert!(submission.validation_errors().is_empty());
    }

    #[test]
    fn test_wire_roundtrip_versioned() {
        let json = serde_json::json!({
            "name": "Ada Lovelace",
            "phoneE164": "+14155551234",
            "email": "ada@example.com",
            "tzIana": "America/New_York",
            "userAgent": "Mozilla/5.0",
            "referer": "https://example.com/opt-in",
            "consentVersion": "v1-2025-09-15",
            "webFormShownCopy": "I agree to receive SMS messages",
            "submittedAtUtcIso": "2025-09-15T12:00:00Z"
        });
        let submission: OptInSubmission = serde_json::from_value(json).unwrap();
        assert!(matches!(submission.consent(), Some(Consent::Versioned { .. })));
        assert!(submission.validation_errors().is_empty());
    }

    #[test]
    fn test_wire_structured_consent() {
        let json = serde_json::json!({
            "name": "Ada Lovelace",
            "phoneE164": "+14155551234",
            "tzIana": "America/New_York",
            "userAgent": "Mozilla/5.0",
            "referer": "",
            "consents": {
                "smsMessaging": true,
                "processingStorage": true,
                "smsDisclosures": true,
                "termsPrivacy": true
            },
            "consentTextVersion": "v2-2025-10-01",
            "submittedAtUtcIso": "2025-10-01T12:00:00Z"
        });
        let submission: OptInSubmission = serde_json::from_value(json).unwrap();
        assert!(matches!(submission.consent(), Some(Consent::Structured { .. })));
        assert!(submission.validation_errors().is_empty());
    }

    #[test]
    fn test_user_agent_summary_truncates() {
        let mut record =
            ConsentRecord::build(versioned_submission(), "unknown".into(), Utc::now()).unwrap();
        record.user_agent = "x".repeat(250);
        let summary = record.user_agent_summary();
        assert!(summary.ends_with("..."));
        assert!(summary.len() <= 104);
    }
}
