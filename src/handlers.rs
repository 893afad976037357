// src/handlers.rs
use crate::{AppState, errors::SocialSyncError, models::*};
use actix_web::{Error, HttpResponse, web};
use uuid::Uuid;

pub async fn generate_campaign(
    body: web::Json<GenerateCampaignRequest>,
    query: web::Query<GenerateCampaignQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let request = body.into_inner();

    let mut cycle = match data.controller.generate(&request.idea, request.tone).await {
        Ok(Some(cycle)) => cycle,
        Ok(None) => return Ok(HttpResponse::NoContent().finish()),
        Err(SocialSyncError::Generation(message)) => {
            return Err(SocialSyncError::Generation(format!(
                "Failed to generate campaign. Please check your API key and try again. ({})",
                message
            ))
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    if query.wait_for_images {
        cycle.wait_for_images().await;
        return Ok(HttpResponse::Ok().json(data.controller.snapshot().await));
    }

    let state = data.controller.snapshot().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "cycle": cycle.cycle,
        "campaign": cycle.campaign,
        "loading_images": state.loading_images
    })))
}

pub async fn get_campaign(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(data.controller.snapshot().await))
}

pub async fn update_post(
    path: web::Path<String>,
    body: web::Json<Post>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let platform: Platform = path.into_inner().parse()?;
    let post = body.into_inner();

    if post.platform != platform {
        return Err(SocialSyncError::Validation(format!(
            "Post is for {} but was sent to {}",
            post.platform, platform
        ))
        .into());
    }

    let updated = data.controller.update_post(post).await?;
    Ok(HttpResponse::Ok().json(&updated))
}

pub async fn open_detail(
    body: web::Json<OpenDetailRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let view = data.controller.open_detail(body.platform).await?;
    Ok(HttpResponse::Created().json(&view))
}

pub async fn get_detail(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let view = data.controller.detail(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn close_detail(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    data.controller.close_detail(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn regenerate_image(
    path: web::Path<Uuid>,
    body: Option<web::Json<RegenerateImageRequest>>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();

    let view = data
        .controller
        .regenerate_image(&path.into_inner(), request)
        .await
        .map_err(|e| match e {
            SocialSyncError::Generation(message) => SocialSyncError::Generation(format!(
                "Failed to regenerate image. Ensure you have access to the model. ({})",
                message
            )),
            other => other,
        })?;

    Ok(HttpResponse::Ok().json(&view))
}

pub async fn animate(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    // The job outlives the request; its outcome is read back through get_detail.
    let (video, _job) = data.controller.animate(&path.into_inner()).await?;
    Ok(HttpResponse::Accepted().json(&video))
}

pub async fn get_blob(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let blob = data.blobs.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type(blob.content_type)
        .body(blob.bytes))
}

pub async fn select_key(
    body: web::Json<SelectKeyRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    data.keys.select(&body.api_key).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "socialsync",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
