/// Authentication Middleware
///
/// `RequireAuth<A>` reads the `Authorization` header, hands it to an
/// [`Authenticator`] and either injects the resulting identity into request
/// extensions or answers the request itself with the mapped error.
/// Handlers read the identity with `web::ReqData<A::Identity>`.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::error::{AppError, AuthError};

/// Turns a raw `Authorization` header value into a typed identity
#[async_trait::async_trait(?Send)]
pub trait Authenticator: Clone + 'static {
    type Identity: Clone + 'static;

    async fn authenticate(&self, header: &str) -> Result<Self::Identity, AppError>;
}

/// Middleware guarding a route with one authenticator
///
/// Apply with `.wrap(RequireAuth::new(...))` on the resources that need it.
#[derive(Clone)]
pub struct RequireAuth<A> {
    authenticator: A,
}

impl<A: Authenticator> RequireAuth<A> {
    pub fn new(authenticator: A) -> Self {
        Self { authenticator }
    }
}

impl<S, B, A> Transform<S, ServiceRequest> for RequireAuth<A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: Authenticator,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S, A>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireAuthService {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

pub struct RequireAuthService<S, A> {
    service: Rc<S>,
    authenticator: A,
}

impl<S, B, A> Service<ServiceRequest> for RequireAuthService<S, A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: Authenticator,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let authenticator = self.authenticator.clone();

        // Absent, empty and non-UTF-8 headers are all the same failure
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_owned);

        Box::pin(async move {
            let outcome = match header {
                Some(header) => authenticator.authenticate(&header).await,
                None => Err(AuthError::MissingOrMalformedHeader.into()),
            };

            match outcome {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(e) => {
                    tracing::warn!(
                        method = %req.method(),
                        path = %req.path(),
                        error = %e,
                        "Request rejected by authentication"
                    );
                    Ok(req.error_response(e).map_into_right_body())
                }
            }
        })
    }
}
