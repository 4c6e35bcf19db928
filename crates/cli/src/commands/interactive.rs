//! Prompt-driven storefront session.
//!
//! Each pass of the loop renders the controller's current screen as a menu.
//! Storefront errors are shown and the session carries on; only a broken
//! terminal ends it.
//!
//! # Usage
//!
//! ```bash
//! sukoon interactive
//! ```

use std::ops::ControlFlow;
use std::path::PathBuf;

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;

use sukoon_core::{CurrencyCode, ViewState};
use sukoon_storefront::AppError;
use sukoon_storefront::Storefront;
use sukoon_storefront::account::{SignInFlow, SignInOutcome, SignInStep};
use sukoon_storefront::admin::{ProductDraft, parse_rate};
use sukoon_storefront::controller::UserAuthToggle;
use sukoon_storefront::services::auth::AuthState;
use sukoon_storefront::services::media::ImageFile;
use sukoon_storefront::services::transcription::AudioClip;
use sukoon_storefront::settings::SettingsUpdate;

use super::account::password_prompt;
use super::shop::print_page;
use super::{CliError, confirm, show_error};

type Step = Result<ControlFlow<()>, CliError>;

/// Run the session until the customer quits.
///
/// # Errors
///
/// Returns `CliError::Prompt` if the terminal stops answering.
pub async fn run(shop: &mut Storefront) -> Result<(), CliError> {
    let _listener = shop
        .state()
        .auth()
        .on_auth_state_changed(|state| match state {
            AuthState::SignedIn(session) => tracing::info!(email = %session.email, "Signed in"),
            AuthState::SignedOut => tracing::info!("Signed out"),
        });

    shop.refresh().await;
    loop {
        let step = match shop.view() {
            ViewState::Shop => shop_screen(shop).await?,
            ViewState::Login => admin_login(shop).await?,
            ViewState::Admin => admin_panel(shop).await?,
            ViewState::UserLogin => user_login(shop).await?,
        };
        if step.is_break() {
            return Ok(());
        }
    }
}

// =============================================================================
// Shop
// =============================================================================

#[derive(Clone, Copy)]
enum ShopAction {
    Buy,
    Currency,
    Voice,
    Account,
    Admin,
    Refresh,
    Quit,
}

#[allow(clippy::print_stdout)]
async fn shop_screen(shop: &mut Storefront) -> Step {
    println!();
    print_page(shop);

    let page = shop.shop_page();
    let mut actions = vec![ShopAction::Buy, ShopAction::Currency];
    if page.transcription_enabled {
        actions.push(ShopAction::Voice);
    }
    actions.extend([
        ShopAction::Account,
        ShopAction::Admin,
        ShopAction::Refresh,
        ShopAction::Quit,
    ]);

    let signed_in = shop.controller().is_user_authenticated();
    let labels: Vec<&str> = actions
        .iter()
        .map(|action| match action {
            ShopAction::Buy => "Buy now",
            ShopAction::Currency => "Change currency",
            ShopAction::Voice => "Voice search",
            ShopAction::Account if signed_in => "Sign out",
            ShopAction::Account => "Sign in",
            ShopAction::Admin => "Admin panel",
            ShopAction::Refresh => "Refresh",
            ShopAction::Quit => "Quit",
        })
        .collect();

    let choice = Select::new()
        .with_prompt(format!("Shop ({})", page.currency))
        .items(&labels)
        .default(0)
        .interact()?;

    match actions.get(choice).copied().unwrap_or(ShopAction::Quit) {
        ShopAction::Buy => {
            if page.is_empty() {
                return Ok(ControlFlow::Continue(()));
            }
            let items: Vec<String> = page
                .cards
                .iter()
                .map(|c| format!("{} ({})", c.name, c.price_label()))
                .collect();
            let picked = Select::new()
                .with_prompt("Which item?")
                .items(&items)
                .default(0)
                .interact()?;
            if let Some(card) = page.cards.get(picked) {
                match shop.buy_now(&card.id) {
                    Ok(url) => println!("Complete your purchase at {url}"),
                    Err(e) => show_error(&e),
                }
            }
        }
        ShopAction::Currency => {
            let codes: Vec<&str> = CurrencyCode::ALL.iter().map(|c| c.code()).collect();
            let current = CurrencyCode::ALL
                .iter()
                .position(|c| *c == page.currency)
                .unwrap_or(0);
            let picked = Select::new()
                .with_prompt("Currency")
                .items(&codes)
                .default(current)
                .interact()?;
            if let Some(currency) = CurrencyCode::ALL.get(picked) {
                shop.set_currency(*currency);
            }
        }
        ShopAction::Voice => voice_search(shop).await?,
        ShopAction::Account => {
            let outcome = shop.toggle_user_auth(confirm).await;
            if outcome == UserAuthToggle::SignOutConfirmed {
                println!("You have been signed out.");
            }
        }
        ShopAction::Admin => {
            shop.navigate(ViewState::Admin).await;
        }
        ShopAction::Refresh => shop.refresh().await,
        ShopAction::Quit => return Ok(ControlFlow::Break(())),
    }
    Ok(ControlFlow::Continue(()))
}

#[allow(clippy::print_stdout)]
async fn voice_search(shop: &Storefront) -> Result<(), CliError> {
    let path: String = Input::new()
        .with_prompt("Audio file")
        .allow_empty(true)
        .interact_text()?;
    if path.trim().is_empty() {
        return Ok(());
    }

    let clip = match AudioClip::from_path(&PathBuf::from(path.trim())).await {
        Ok(clip) => clip,
        Err(e) => {
            println!("Could not read audio: {e}");
            return Ok(());
        }
    };
    match shop.transcribe(&clip).await {
        Ok(text) => println!("You said: {text}"),
        Err(e) => show_error(&e),
    }
    Ok(())
}

// =============================================================================
// Customer sign-in
// =============================================================================

#[allow(clippy::print_stdout)]
async fn user_login(shop: &mut Storefront) -> Step {
    let mut flow = SignInFlow::new();

    loop {
        println!();
        println!("{}", flow.title());
        if let Some(message) = flow.error() {
            println!("{message}");
        }

        match flow.step() {
            SignInStep::Email => {
                flow.email = Input::new()
                    .with_prompt("Email")
                    .with_initial_text(flow.email.clone())
                    .allow_empty(true)
                    .interact_text()?;

                let switch = if flow.is_sign_up() {
                    "I already have an account"
                } else {
                    "Create an account"
                };
                let choice = Select::new()
                    .items(&["Continue", switch, "Cancel"])
                    .default(0)
                    .interact()?;
                match choice {
                    0 => {
                        shop.submit_sign_in(&mut flow).await;
                    }
                    1 => flow.toggle_sign_up(),
                    _ => break,
                }
            }
            SignInStep::Password => {
                let choice = Select::new()
                    .with_prompt(flow.email.as_str())
                    .items(&["Enter password", "Forgot password", "Back", "Cancel"])
                    .default(0)
                    .interact()?;
                match choice {
                    0 => {
                        flow.password = password_prompt(&flow)?;
                        if let SignInOutcome::SignedIn(session) =
                            shop.submit_sign_in(&mut flow).await
                        {
                            println!("Welcome, {}", session.email);
                            return Ok(ControlFlow::Continue(()));
                        }
                    }
                    1 => shop.forgot_password(&mut flow).await,
                    2 => flow.back(),
                    _ => break,
                }
            }
            SignInStep::ResetSent => {
                println!("A password reset link was sent to {}.", flow.email);
                let choice = Select::new()
                    .items(&["Back to sign in", "Cancel"])
                    .default(0)
                    .interact()?;
                if choice == 0 {
                    flow.back();
                } else {
                    break;
                }
            }
        }
    }

    shop.cancel_user_login().await;
    Ok(ControlFlow::Continue(()))
}

// =============================================================================
// Admin
// =============================================================================

#[allow(clippy::print_stdout)]
async fn admin_login(shop: &mut Storefront) -> Step {
    let pin = Password::new()
        .with_prompt("Access PIN (leave blank to cancel)")
        .allow_empty_password(true)
        .interact()?;

    if pin.is_empty() {
        shop.cancel_admin_login().await;
        return Ok(ControlFlow::Continue(()));
    }

    if let Err(e) = shop.submit_admin_pin(&pin).await {
        show_error(&e);
        println!(
            "Forgot your PIN? Recover access at {}",
            shop.controller().settings().admin_reset_url
        );
    }
    Ok(ControlFlow::Continue(()))
}

#[allow(clippy::print_stdout)]
async fn admin_panel(shop: &mut Storefront) -> Step {
    let choice = Select::new()
        .with_prompt("Admin panel")
        .items(&[
            "Inventory",
            "Add product",
            "Remove product",
            "Settings",
            "Back to shop",
            "Log out",
        ])
        .default(0)
        .interact()?;

    match choice {
        0 => print_inventory(shop),
        1 => add_product(shop).await?,
        2 => remove_product(shop).await?,
        3 => edit_settings(shop)?,
        4 => {
            shop.navigate(ViewState::Shop).await;
        }
        _ => {
            shop.admin_logout().await;
            println!("Logged out of the admin panel.");
        }
    }
    Ok(ControlFlow::Continue(()))
}

#[allow(clippy::print_stdout)]
fn print_inventory(shop: &Storefront) {
    if shop.products().is_empty() {
        println!("No products yet.");
    }
    for product in shop.products() {
        println!(
            "{}  {}  [{}]  USD {}",
            product.id, product.name, product.item_code, product.price
        );
    }
}

fn required_text(prompt: &str) -> Result<String, CliError> {
    Ok(Input::new().with_prompt(prompt).interact_text()?)
}

#[allow(clippy::print_stdout)]
async fn add_product(shop: &mut Storefront) -> Result<(), CliError> {
    let mut draft = ProductDraft {
        name: required_text("Name")?,
        item_code: required_text("Item code")?,
        destination_url: required_text("Destination URL")?,
        description: required_text("Description")?,
        price: required_text("Price (USD)")?,
        image: None,
    };

    let image_path: String = Input::new()
        .with_prompt("Image file")
        .allow_empty(true)
        .interact_text()?;
    if !image_path.trim().is_empty() {
        match ImageFile::from_path(&PathBuf::from(image_path.trim())).await {
            Ok(image) => draft.image = Some(image),
            Err(e) => {
                println!("Could not read image: {e}");
                return Ok(());
            }
        }
    }

    match shop.publish_product(draft).await {
        Ok(()) => println!("Product published"),
        Err(e) => show_error(&e),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn remove_product(shop: &mut Storefront) -> Result<(), CliError> {
    if shop.products().is_empty() {
        println!("No products yet.");
        return Ok(());
    }

    let items: Vec<String> = shop
        .products()
        .iter()
        .map(|p| format!("{} [{}]", p.name, p.item_code))
        .collect();
    let picked = Select::new()
        .with_prompt("Remove which item?")
        .items(&items)
        .default(0)
        .interact()?;
    let Some(id) = shop.products().get(picked).map(|p| p.id.clone()) else {
        return Ok(());
    };

    match shop.remove_product(&id, confirm).await {
        Ok(true) => println!("Removed"),
        Ok(false) => {}
        Err(e) => show_error(&e),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn edit_settings(shop: &mut Storefront) -> Result<(), CliError> {
    let settings = shop.controller().settings().clone();
    println!(
        "Google login: {}",
        if settings.google_login_enabled { "on" } else { "off" }
    );
    println!(
        "Voice transcription: {}",
        if settings.transcription_enabled { "on" } else { "off" }
    );
    println!("1 USD = {} PKR", settings.exchange_rate_pkr);
    println!("1 USD = {} AED", settings.exchange_rate_aed);
    println!("PIN recovery page: {}", settings.admin_reset_url);

    let choice = Select::new()
        .with_prompt("Change")
        .items(&[
            "Toggle Google login",
            "Toggle voice transcription",
            "PKR exchange rate",
            "AED exchange rate",
            "Admin PIN",
            "PIN recovery page",
            "Nothing",
        ])
        .default(6)
        .interact()?;

    let update = match choice {
        0 => SettingsUpdate {
            google_login_enabled: Some(!settings.google_login_enabled),
            ..SettingsUpdate::default()
        },
        1 => SettingsUpdate {
            transcription_enabled: Some(!settings.transcription_enabled),
            ..SettingsUpdate::default()
        },
        2 | 3 => {
            let code = if choice == 2 { "PKR" } else { "AED" };
            let input: String = Input::new()
                .with_prompt(format!("1 USD in {code}"))
                .interact_text()?;
            let rate = match parse_rate(code, &input) {
                Ok(rate) => rate,
                Err(e) => {
                    show_error(&AppError::from(e));
                    return Ok(());
                }
            };
            if choice == 2 {
                SettingsUpdate {
                    exchange_rate_pkr: Some(rate),
                    ..SettingsUpdate::default()
                }
            } else {
                SettingsUpdate {
                    exchange_rate_aed: Some(rate),
                    ..SettingsUpdate::default()
                }
            }
        }
        4 => {
            let pin = Password::new()
                .with_prompt("New PIN")
                .with_confirmation("Repeat PIN", "PINs do not match")
                .interact()?;
            SettingsUpdate {
                admin_pin: Some(SecretString::from(pin)),
                ..SettingsUpdate::default()
            }
        }
        5 => SettingsUpdate {
            admin_reset_url: Some(required_text("Recovery URL")?),
            ..SettingsUpdate::default()
        },
        _ => return Ok(()),
    };

    match shop.update_settings(update) {
        Ok(()) => println!("Settings saved"),
        Err(e) => show_error(&e),
    }
    Ok(())
}
