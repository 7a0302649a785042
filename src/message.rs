//! Follow-up message composition — tier selection and spintax templates.
//!
//! The copy escalates with the follow-up count: initial request, friendly
//! reminder, urgent reminder, final notice. Each template embeds spintax
//! groups so consecutive reminders vary in tone without changing meaning.

use rand::Rng;

use crate::model::OnboardingRecord;
use crate::spintax;

/// Escalation tier for a follow-up email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpTier {
    /// First contact, count 0.
    Initial,
    /// Counts 1 and 2.
    Early,
    /// Counts 3 through 6.
    Urgent,
    /// Count 7 and above.
    Final,
}

impl FollowUpTier {
    /// Map a follow-up count onto its tier.
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Self::Initial,
            1..=2 => Self::Early,
            3..=6 => Self::Urgent,
            _ => Self::Final,
        }
    }
}

/// A rendered email, ready for the mailer.
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Compose the follow-up email for a record at the given count.
///
/// The caller supplies the `Rng` that drives spintax choices; fix the seed
/// in tests for deterministic output.
pub fn compose<R: Rng + ?Sized>(
    record: &OnboardingRecord,
    count: u32,
    rng: &mut R,
) -> EmailContent {
    let name = record.display_name();
    let amount = record.display_amount();
    let (subject_tpl, body_tpl) = templates(FollowUpTier::from_count(count), name, &amount);

    let subject = spintax::render(&subject_tpl, rng);
    let text_body = spintax::render(&body_tpl, rng);
    let html_body = html_body(record, &text_body);

    EmailContent {
        subject,
        text_body,
        html_body,
    }
}

/// Subject and body templates for one tier, with the record context spliced
/// in before spintax rendering.
fn templates(tier: FollowUpTier, name: &str, amount: &str) -> (String, String) {
    match tier {
        FollowUpTier::Initial => (
            format!(
                "{{Action Required: Additional Information|Important: Documentation Needed}} \
                 for {name}'s Non-Recourse Factoring Application"
            ),
            format!(
                "{{Dear|Hello|Hi}} {name},\n\n\
                 Your client {name} has submitted an application for a working capital line of \
                 credit through our non-recourse factoring facility. To proceed with the \
                 underwriting process, we need additional documentation and information.\n\n\
                 This non-recourse factoring facility will allow your client to {{access \
                 immediate working capital|improve cash flow|optimize their receivables}} \
                 without the risk of customer non-payment. The current requested facility \
                 amount is {amount}.\n\n\
                 {{Please use the secure link below|Click the secure link below|Access our \
                 secure portal via the link below}} to provide the required documentation and \
                 complete the application process.\n\n\
                 {{The required documentation includes:|We need the following items to \
                 proceed:|Please submit these essential documents:}}\n\
                 - Recent accounts receivable aging report\n\
                 - Sample invoices and purchase orders\n\
                 - Last 3 months of bank statements\n\
                 - Customer concentration information\n\
                 - {{Historical factoring experience, if applicable|Past factoring experience, \
                 if any|Any previous factoring arrangements}}\n\n\
                 {{If we do not receive this information within 7 days, the application may be \
                 delayed.|Your prompt response within 7 days will ensure timely processing.|We \
                 recommend submitting these documents within 7 days to avoid delays.}}\n\n\
                 {{If you have any questions about this non-recourse facility, please contact \
                 us.|If you need clarification on any requirements, our team is ready to \
                 assist.|For any questions regarding the non-recourse structure, please reach \
                 out.}}"
            ),
        ),
        FollowUpTier::Early => (
            format!(
                "{{Reminder: Documentation Needed|Follow-up: Additional Information Required}} \
                 for {name}'s Non-Recourse Factoring Facility"
            ),
            format!(
                "{{Dear|Hello|Hi}} {name},\n\n\
                 {{This is a friendly reminder|We wanted to follow up|We're reaching out \
                 again}} regarding the non-recourse factoring facility application for \
                 {name}.\n\n\
                 To proceed with underwriting for this {amount} non-recourse facility, we \
                 still need {{additional documentation|the requested information|important \
                 documents}} from you. {{The non-recourse structure offers significant \
                 protection against customer non-payment risk.|This facility will transfer the \
                 credit risk to us, protecting your client from non-payment.|Our non-recourse \
                 solution will safeguard your client against customer default.}}\n\n\
                 {{Please use the secure link below to upload the required \
                 documentation.|Click the secure link below to provide the necessary \
                 information.|Access our secure portal to submit the outstanding \
                 documents.}}\n\n\
                 {{If you're experiencing any difficulties gathering the required \
                 documentation, please let us know.|Need assistance collecting the required \
                 information? Our team can help.|Having trouble with any of the documentation \
                 requirements? Contact us for support.}}"
            ),
        ),
        FollowUpTier::Urgent => (
            format!(
                "{{Urgent: Action Required|Important Follow-up Needed}} for {name}'s \
                 Non-Recourse Factoring Application"
            ),
            format!(
                "{{Dear|Hello|Hi}} {name},\n\n\
                 {{We have not yet received|We are still waiting for|We still need}} the \
                 required documentation for {name}'s non-recourse factoring facility \
                 application for {amount}.\n\n\
                 {{Delaying this process may impact your client's ability to secure this \
                 valuable financing solution.|Without the required documentation, we cannot \
                 proceed with underwriting this non-recourse facility.|The benefits of \
                 non-recourse factoring, including credit risk protection, are on hold pending \
                 your submission.}}\n\n\
                 {{Please use the secure link below to provide the outstanding information \
                 immediately.|Click the secure link below to upload the required documentation \
                 without delay.|Access our secure portal now to submit the necessary \
                 documents.}}\n\n\
                 {{If there are specific challenges preventing you from submitting these \
                 documents, please contact us immediately.|Facing obstacles with document \
                 collection? Let us know how we can help.|If you need assistance with any \
                 aspect of the application, our team is standing by.}}"
            ),
        ),
        FollowUpTier::Final => (
            format!(
                "{{Final Notice|Last Opportunity|Critical Update}}: {name}'s Non-Recourse \
                 Factoring Application"
            ),
            format!(
                "{{Dear|Hello|Hi}} {name},\n\n\
                 {{This is our final outreach|This is our last attempt to contact you|We're \
                 making a final effort to reach you}} regarding {name}'s incomplete \
                 non-recourse factoring facility application for {amount}.\n\n\
                 {{Without the required documentation, we will need to close this application \
                 within 48 hours.|Your client's opportunity to secure this non-recourse \
                 facility will expire in the next 48 hours without action.|We must conclude \
                 this application process within 48 hours if we don't receive the required \
                 information.}}\n\n\
                 {{Please use the secure link below immediately to complete this \
                 process.|Click the secure link now to provide the required \
                 information.|Access our secure portal right away to submit the outstanding \
                 documentation.}}\n\n\
                 {{If your client's financing needs have changed, please let us know.|If you \
                 wish to withdraw this application or discuss alternatives, please contact \
                 us.|Should you need to discuss the status of this application, our team is \
                 available to assist.}}"
            ),
        ),
    }
}

/// Wrap the rendered text body in the branded HTML layout, with a link back
/// into the application flow for this record.
fn html_body(record: &OnboardingRecord, text_body: &str) -> String {
    let paragraphs: String = text_body
        .split("\n\n")
        .map(|p| {
            format!(
                "<p style=\"margin-bottom: 20px; color: #555;\">{}</p>\n",
                p.replace('\n', "<br>")
            )
        })
        .collect();

    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="Content-Type" content="text/html; charset=UTF-8">
    <title>Non-Recourse Factoring Application</title>
  </head>
  <body style="background-color: #f9f9f9; font-family: 'Helvetica Neue', Arial, sans-serif; font-size: 16px; line-height: 1.6; margin: 0; padding: 0; color: #333333;">
  <div style="background-image: linear-gradient(120deg, #2e9787, #1a7a6d); padding: 30px 20px; text-align: center;">
    <img src="https://originatecapital.co/wp-content/uploads/2020/04/Horizontal-Dark-480.png" alt="Originate Capital Logo" width="180" style="max-width: 100%;">
  </div>
  <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 4px 6px rgba(0,0,0,0.05); margin-top: -20px; padding: 30px; position: relative;">
    <h1 style="font-weight: 300; color: #333; font-size: 24px; margin-bottom: 25px;">Non-Recourse Factoring Application</h1>
    {paragraphs}
    <div style="text-align: center; margin: 35px 0;">
      <a href="https://app.originatecapital.co/register?onboardingId={id}"
         style="display: inline-block; background-color: #2e9787; color: white; padding: 14px 28px; text-decoration: none; border-radius: 4px; font-weight: 500; border: none;">
         Provide Required Information
      </a>
    </div>
    <div style="background-color: #f5f9f8; border-left: 4px solid #2e9787; padding: 15px; margin: 30px 0;">
      <h3 style="margin-top: 0; color: #2e9787;">Benefits of Non-Recourse Factoring</h3>
      <ul style="padding-left: 20px;">
        <li>Transfer credit risk to the factor</li>
        <li>Protection against customer bankruptcy or default</li>
        <li>Improve cash flow without increasing debt</li>
        <li>Secure working capital backed by accounts receivable</li>
      </ul>
    </div>
  </div>
  <div style="max-width: 600px; margin: 0 auto; padding: 20px; text-align: center; color: #888; font-size: 14px;">
    <p>Originate Capital Inc, 8 The Green, Dover DE 19901</p>
    <p style="font-size: 12px; color: #aaa;">This message contains confidential information and is intended only for the recipient. If you received this in error, please contact us immediately.</p>
  </div>
</body>
</html>
"#,
        paragraphs = paragraphs,
        id = record.id,
    )
}
