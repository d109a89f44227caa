use std::future::IntoFuture;

use error_stack::Report;
use kernel::KernelError;
use serde::Serialize;
use serde_json::Value;

use crate::error::ErrorStatus;

// Original: https://github.com/HalsekiRaika/architectured/blob/e5caa5c7ae801d1aaac6e275b3ea0ef26d6ff26b/server/src/controller.rs
pub trait Intake<I>: 'static + Sync + Send {
    type To;
    fn emit(&self, input: I) -> Self::To;
}

pub trait Exhaust<O>: 'static + Sync + Send {
    type To;
    fn emit(&self, output: O) -> Self::To;
}

/// Turns a request into a dto, runs a service with it and presents the result.
///
/// The submitted input is kept as JSON so that a rejected request can be
/// answered with what the client sent.
pub struct Controller<T, P> {
    transformer: T,
    presenter: P,
}

impl<T, P> Controller<T, P> {
    pub fn new(transformer: T, presenter: P) -> Self {
        Self {
            transformer,
            presenter,
        }
    }

    pub fn intake<I>(self, input: I) -> Transformed<P, T::To>
    where
        I: Serialize,
        T: Intake<I>,
    {
        let echo = serde_json::to_value(&input).ok();
        Transformed {
            transformed: self.transformer.emit(input),
            echo,
            presenter: self.presenter,
        }
    }
}

impl<P> Controller<(), P> {
    pub async fn bypass<F, Fut, O>(self, f: F) -> Result<P::To, ErrorStatus>
    where
        P: Exhaust<O>,
        F: FnOnce() -> Fut,
        Fut: IntoFuture<Output = Result<O, Report<KernelError>>>,
    {
        let output = f().await.map_err(ErrorStatus::from)?;
        Ok(self.presenter.emit(output))
    }
}

pub struct Transformed<P, D> {
    transformed: D,
    echo: Option<Value>,
    presenter: P,
}

impl<P, D> Transformed<P, D> {
    pub async fn handle<F, Fut, O>(self, f: F) -> Result<P::To, ErrorStatus>
    where
        P: Exhaust<O>,
        F: FnOnce(D) -> Fut,
        Fut: IntoFuture<Output = Result<O, Report<KernelError>>>,
    {
        let Self {
            transformed,
            echo,
            presenter,
        } = self;
        match f(transformed).await {
            Ok(output) => Ok(presenter.emit(output)),
            Err(report) => Err(ErrorStatus::from(report).with_input(echo)),
        }
    }
}
