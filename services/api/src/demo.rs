use crate::infra::{
    seed_demo_records, InMemoryAccountStore, InMemoryApplicationRepository,
    InMemoryIdentityDirectory, InMemoryLicenseRegistry, InMemoryTokenBlacklist,
};
use chrono::Local;
use clap::Args;
use std::sync::Arc;
use dl_portal::accounts::{AccountService, Registration, TokenIssuer};
use dl_portal::config::AuthConfig;
use dl_portal::error::AppError;
use dl_portal::registry::{LicenseLookupService, NationalId};
use dl_portal::workflows::applications::{
    ApplicationStatus, LicenseApplicationService, NewApplicationSubmission, ReissueSubmission,
    RenewalSubmission,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the renewal and reissue portion of the demo.
    #[arg(long)]
    pub(crate) skip_renewal: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { skip_renewal } = args;

    println!("Driver's license portal demo");

    let identities = Arc::new(InMemoryIdentityDirectory::default());
    let licenses = Arc::new(InMemoryLicenseRegistry::default());
    if let Err(err) = seed_demo_records(&identities, &licenses) {
        println!("  Seeding failed: {}", err);
        return Ok(());
    }

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let accounts = Arc::new(InMemoryAccountStore::default());
    let blacklist = Arc::new(InMemoryTokenBlacklist::default());
    let tokens = Arc::new(TokenIssuer::new(&AuthConfig {
        token_secret: "demo-only-secret".to_string(),
        access_ttl_minutes: 30,
        refresh_ttl_days: 1,
    }));

    let account_service = Arc::new(AccountService::new(
        identities.clone(),
        accounts,
        blacklist,
        tokens,
    ));
    let application_service = Arc::new(LicenseApplicationService::new(
        identities,
        licenses.clone(),
        applications,
    ));
    let lookup_service = Arc::new(LicenseLookupService::new(licenses));

    println!("\nAccount registration");
    let registration = Registration {
        national_id: NationalId("NID-1001".to_string()),
        email: "Adaeze.Okafor@example.test".to_string(),
        password: "correct horse battery staple".to_string(),
        first_name: "Adaeze".to_string(),
        last_name: "Okafor".to_string(),
    };
    let (view, pair) = match account_service.register(registration) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Registration rejected: {}", err);
            return Ok(());
        }
    };
    println!("- Registered {} ({})", view.email, view.national_id.0);
    println!("  Access token issued ({} chars)", pair.access.len());

    match account_service.logout(&pair.refresh) {
        Ok(()) => println!("  Refresh token revoked on logout"),
        Err(err) => println!("  Logout failed: {}", err),
    }
    if account_service.logout(&pair.refresh).is_err() {
        println!("  Replaying the revoked refresh token is rejected");
    }

    println!("\nNew license application");
    let submission = NewApplicationSubmission {
        national_id: NationalId("NID-1001".to_string()),
        is_motor_cycle: false,
        is_motor_vehicle: true,
        certificate_number: 73_021,
        local_government_area: "Ikeja".to_string(),
        state: "Lagos".to_string(),
        center_location: "Ikeja Licensing Office".to_string(),
        email: "adaeze.okafor@example.test".to_string(),
        phone_number: "+2348012340001".to_string(),
    };
    let mut application = match application_service.submit_new(submission) {
        Ok(application) => application,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Received application {} -> status {}",
        application.application_id,
        application.status.label()
    );

    for target in [
        ApplicationStatus::Processing,
        ApplicationStatus::Approved,
        ApplicationStatus::ReadyForPrinting,
    ] {
        application = match application_service
            .advance_status(&application.application_id, target)
        {
            Ok(application) => application,
            Err(err) => {
                println!("  Transition halted: {}", err);
                return Ok(());
            }
        };
        println!("  Advanced to {}", application.status.label());
    }

    let issued = match application.license.clone() {
        Some(license_id) => license_id,
        None => {
            println!("  No license issued for the approved application");
            return Ok(());
        }
    };
    let today = Local::now().date_naive();
    match lookup_service.validity(&issued, today) {
        Ok(validity) => println!("- License {} is {}", issued.0, validity.label()),
        Err(err) => println!("- License lookup failed: {}", err),
    }

    if skip_renewal {
        return Ok(());
    }

    println!("\nRenewal for the seeded license holder");
    let renewal = RenewalSubmission {
        national_id: Some(NationalId("NID-1002".to_string())),
        is_motor_cycle: false,
        is_motor_vehicle: true,
        certificate_number: 73_022,
        local_government_area: "Kano Municipal".to_string(),
        state: "Kano".to_string(),
        center_location: "Kano Central Licensing Office".to_string(),
        email: "musa.bello@example.test".to_string(),
        phone_number: "+2348012340002".to_string(),
    };
    let seeded_license = dl_portal::registry::LicenseId("DL-2023-0001".to_string());
    match application_service.submit_renewal(&seeded_license, renewal.clone()) {
        Ok(application) => println!(
            "- Renewal {} -> status {}",
            application.application_id,
            application.status.label()
        ),
        Err(err) => println!("- Renewal rejected: {}", err),
    }
    if let Err(err) = application_service.submit_renewal(&seeded_license, renewal) {
        println!("  Duplicate renewal rejected: {}", err);
    }

    let reissue = ReissueSubmission {
        national_id: Some(NationalId("NID-1002".to_string())),
        is_motor_cycle: false,
        is_motor_vehicle: true,
        certificate_number: 73_023,
        local_government_area: "Kano Municipal".to_string(),
        state: "Kano".to_string(),
        center_location: "Kano Central Licensing Office".to_string(),
        email: "musa.bello@example.test".to_string(),
        phone_number: "+2348012340002".to_string(),
        reissue_reason: Some("stolen wallet".to_string()),
        reissue_document_key: Some("documents/police-report-4417.pdf".to_string()),
    };
    match application_service.submit_reissue(&seeded_license, reissue) {
        Ok(application) => println!(
            "- Reissue {} -> status {}",
            application.application_id,
            application.status.label()
        ),
        Err(err) => println!("- Reissue rejected while the renewal is in flight: {}", err),
    }

    Ok(())
}
