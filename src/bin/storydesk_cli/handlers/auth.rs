#![deny(clippy::all, clippy::pedantic)]

use serde_json::json;
use storydesk::api_types::RegisterRequest;
use time::format_description::well_known::Rfc3339;

use crate::args::AuthCmd;
use crate::client::{CliError, Ctx};
use crate::io::read_password;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: AuthCmd) -> Result<(), CliError> {
    let auth = ctx.auth();
    match cmd {
        AuthCmd::Login { email, password } => {
            let password = read_password(password)?;
            let session = auth.login(&email, &password).await?;
            print_json(&json!({
                "signedIn": true,
                "email": session.email,
                "issuedAt": format_issued(session.issued_at),
            }))
        }
        AuthCmd::Logout => {
            auth.logout().await?;
            print_json(&json!({ "signedIn": false }))
        }
        AuthCmd::Status => match auth.current().await? {
            Some(session) => print_json(&json!({
                "signedIn": true,
                "email": session.email,
                "issuedAt": format_issued(session.issued_at),
            })),
            None => print_json(&json!({ "signedIn": false })),
        },
        AuthCmd::Account => print_json(&auth.account().await?),
        AuthCmd::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let request = RegisterRequest {
                first_name,
                last_name,
                email,
                password: read_password(password)?,
            };
            print_json(&auth.register(request).await?)
        }
        AuthCmd::ForgotPassword { email } => print_json(&auth.forgot_password(&email).await?),
        AuthCmd::ResetPassword { token, password } => {
            let password = read_password(password)?;
            print_json(&auth.reset_password(&token, &password).await?)
        }
    }
}

fn format_issued(at: time::OffsetDateTime) -> Option<String> {
    at.format(&Rfc3339).ok()
}
