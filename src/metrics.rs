use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of requests served by the `/app` file server since start or the
/// last reset.
#[derive(Debug, Default)]
pub struct FileserverHits(AtomicU64);

impl FileserverHits {
    pub fn record(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Counts every request that reaches the wrapped service, whatever its
/// outcome.
pub struct CountHits {
    hits: web::Data<FileserverHits>,
}

impl CountHits {
    pub fn new(hits: web::Data<FileserverHits>) -> Self {
        Self { hits }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CountHits
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CountHitsService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(CountHitsService {
            service: Rc::new(service),
            hits: self.hits.clone(),
        }))
    }
}

pub struct CountHitsService<S> {
    service: Rc<S>,
    hits: web::Data<FileserverHits>,
}

impl<S, B> Service<ServiceRequest> for CountHitsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let total = self.hits.record();
        tracing::debug!(path = %req.path(), hits = total, "File server hit");

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
