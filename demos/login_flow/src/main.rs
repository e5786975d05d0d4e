use nptask::prelude::*;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug)]
struct Session {
    user: String,
}

#[derive(Clone, Debug, Error)]
enum LoginError {
    #[error("invalid credentials")]
    InvalidCredentials,
}

#[derive(Clone)]
struct Credentials {
    user: String,
    password: String,
}

async fn authenticate(credentials: Credentials) -> Result<Session, LoginError> {
    // Stands in for a round-trip to an identity provider.
    tasks::sleep(Duration::from_millis(150)).await;

    if credentials.password == "hunter2" {
        Ok(Session {
            user: credentials.user,
        })
    } else {
        Err(LoginError::InvalidCredentials)
    }
}

fn main() {
    tasks::init(TasksConfig::default());

    let login = PromiseSignal::with_args(authenticate)
        .with_on_fulfilled(|session: &Session| println!("signed in as {}", session.user))
        .with_on_rejected(|error: &LoginError| println!("sign-in failed: {error}"));

    login.listen(Box::new(|state: &PromiseState<Session, LoginError>| {
        println!("  -> {:?}", state.status());
    }));

    // Cancels the signal when this scope unwinds, like a component unmount.
    let _teardown = login.cancel_guard();

    tasks::block_on(async {
        println!("submitting a wrong password");
        login
            .invoke(Credentials {
                user: "jakob".to_string(),
                password: "letmein".to_string(),
            })
            .await;

        println!("submitting the right password");
        login
            .invoke_with(
                InvokeOptions::new(Credentials {
                    user: "jakob".to_string(),
                    password: "hunter2".to_string(),
                })
                .on_fulfilled(|session: &Session| {
                    println!("this submission specifically signed in {}", session.user)
                }),
            )
            .await;

        println!("session: {:?}", login.data().map(|session| session.user));

        login.reset();
        println!("after reset, idling: {}", login.is_idling());
    });

    tasks::shutdown();
}
