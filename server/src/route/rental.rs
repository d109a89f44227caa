use application::service::{
    CreateRentalService, GetAllRentalService, GetRentalFormService, GetRentalService,
    UpdateRentalService, ValidateTransitionService,
};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::controller::Controller;
use crate::handler::AppModule;
use crate::request::{
    CreateRentalRequest, EditRentalRequest, GetRentalRequest, RentalTransformer,
    TransitionRequest, UpdateRentalRequest,
};
use crate::response::{CreatedRentalPresenter, RentalPresenter};

pub trait RentalRouter {
    fn route_rental(self) -> Self;
}

impl RentalRouter for Router<AppModule> {
    fn route_rental(self) -> Self {
        self.route(
            "/rentals",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), RentalPresenter)
                    .bypass(|| module.pgpool().get_all_rentals())
                    .await
            })
            .post(
                |State(module): State<AppModule>, Json(req): Json<CreateRentalRequest>| async move {
                    Controller::new(RentalTransformer, CreatedRentalPresenter)
                        .intake(req)
                        .handle(|dto| module.pgpool().create_rental(dto))
                        .await
                },
            ),
        )
        .route(
            "/rentals/form",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), RentalPresenter)
                    .bypass(|| module.pgpool().get_rental_form())
                    .await
            }),
        )
        .route(
            "/rentals/transition",
            get(
                |State(module): State<AppModule>, Query(req): Query<TransitionRequest>| async move {
                    Controller::new(RentalTransformer, RentalPresenter)
                        .intake(req)
                        .handle(|dto| async move { module.pgpool().validate_transition(dto) })
                        .await
                },
            ),
        )
        .route(
            "/rentals/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(RentalTransformer, RentalPresenter)
                        .intake(GetRentalRequest::new(id))
                        .handle(|dto| module.pgpool().get_rental(dto))
                        .await
                },
            )
            .put(
                |State(module): State<AppModule>,
                 Path(id): Path<Uuid>,
                 Json(req): Json<UpdateRentalRequest>| async move {
                    Controller::new(RentalTransformer, RentalPresenter)
                        .intake(EditRentalRequest::new(id, req))
                        .handle(|dto| module.pgpool().update_rental(dto))
                        .await
                },
            ),
        )
    }
}
