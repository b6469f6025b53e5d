//! Sign-in, sign-out, and theme commands.

use clap::{Args, ValueEnum};
use zenbuy_storefront::account;
use zenbuy_storefront::backend::Credentials;
use zenbuy_storefront::error::Result;
use zenbuy_storefront::session::Theme;

use super::Context;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    email: String,

    /// Account password
    #[arg(long, env = "ZENBUY_PASSWORD", hide_env_values = true)]
    password: String,

    /// Sign in through the administrator endpoint
    #[arg(long)]
    admin: bool,
}

/// Print the theme, or change it.
#[allow(clippy::print_stdout)]
pub fn theme(ctx: &mut Context, action: Option<ThemeAction>) -> Result<()> {
    let theme = match action {
        None => ctx.session.theme(),
        Some(ThemeAction::Light) => set(ctx, Theme::Light)?,
        Some(ThemeAction::Dark) => set(ctx, Theme::Dark)?,
        Some(ThemeAction::Toggle) => ctx.session.toggle_theme()?,
    };
    println!("{}", theme.as_str());
    Ok(())
}

fn set(ctx: &mut Context, theme: Theme) -> Result<Theme> {
    ctx.session.set_theme(theme)?;
    Ok(theme)
}

#[allow(clippy::print_stdout)]
pub async fn login(ctx: &mut Context, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(args.email, args.password);
    let user = if args.admin {
        account::admin_login(&mut ctx.session, &ctx.client, &credentials).await?
    } else {
        account::login(&mut ctx.session, &ctx.client, &credentials).await?
    };

    let name = if user.name.is_empty() { &user.email } else { &user.name };
    println!("Signed in as {name}.");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn logout(ctx: &mut Context) -> Result<()> {
    account::logout(&mut ctx.session)?;
    println!("Signed out.");
    Ok(())
}
