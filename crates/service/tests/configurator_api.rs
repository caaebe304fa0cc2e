use std::sync::Arc;

use serde_json::json;

use configurator_catalog::{Hotspot, Price, Product};
use configurator_core::{PropertyId, VariantId};
use configurator_engine::{DimensionSelections, Selection};
use configurator_fit::{Measurements, ShapeCategory};
use configurator_infra::{CatalogFixture, EngineConfig, InMemoryCatalogStore, InMemorySkuStore};
use configurator_service::{
    ConfiguratorService, GenerateVariantsRequest, GenerateVariantsResponse, MeasurementsRequest,
    ResolveSkuResponse, SelectionRequest, ServiceError, ShapeResponse,
};

type Service = ConfiguratorService<Arc<InMemoryCatalogStore>, Arc<InMemorySkuStore>>;

const CHAIR: &str = r#"{
    "products": [{
        "name": "Chair",
        "code": "CHAIR",
        "base_price": 100,
        "image_ref": "chair.png",
        "properties": [
            { "name": "Style", "hotspot": { "x": 0.25, "y": 0.3 },
              "variants": [{ "name": "A" }, { "name": "B", "price_delta": 50, "image_ref": "b.png" }] },
            { "name": "Material",
              "variants": [{ "name": "X" }, { "name": "Y", "price_delta": 30 }] },
            { "name": "Finish" }
        ]
    }]
}"#;

struct Chair {
    service: Service,
    product: Product,
    style: PropertyId,
    material: PropertyId,
    finish: PropertyId,
    a: VariantId,
    b: VariantId,
    x: VariantId,
    y: VariantId,
}

fn chair() -> Chair {
    let catalog = Arc::new(InMemoryCatalogStore::new());
    let product = CatalogFixture::from_json(CHAIR)
        .unwrap()
        .seed(&catalog)
        .unwrap()
        .remove(0);
    let d = &product.dimensions;
    Chair {
        style: d[0].property.id,
        material: d[1].property.id,
        finish: d[2].property.id,
        a: d[0].variants[0].id,
        b: d[0].variants[1].id,
        x: d[1].variants[0].id,
        y: d[1].variants[1].id,
        service: ConfiguratorService::new(catalog, Arc::new(InMemorySkuStore::new())),
        product,
    }
}

fn generate_all(c: &Chair) -> GenerateVariantsResponse {
    let body = json!({
        "product_id": c.product.id.to_string(),
        "dimensions": {
            c.style.to_string(): [c.a.to_string(), c.b.to_string()],
            c.material.to_string(): [c.x.to_string(), c.y.to_string()],
            c.finish.to_string(): []
        }
    });
    let request: GenerateVariantsRequest = serde_json::from_value(body).unwrap();
    let (product_id, selections) = request.into_parts().unwrap();
    c.service
        .generate_variants(product_id, &selections)
        .unwrap()
        .into()
}

#[test]
fn chair_generates_four_priced_skus() {
    let c = chair();
    let response = generate_all(&c);

    assert_eq!(response.skipped, 0);
    assert!(response.failed.is_empty());
    let mut prices: Vec<_> = response.created.iter().map(|s| s.price).collect();
    prices.sort();
    assert_eq!(prices, vec![Price(100), Price(130), Price(150), Price(180)]);

    let codes: Vec<_> = response
        .created
        .iter()
        .filter_map(|s| s.code.as_deref())
        .collect();
    assert!(codes.contains(&"CHAIR-B-Y"));
}

#[test]
fn regenerating_is_idempotent() {
    let c = chair();
    generate_all(&c);
    let again = generate_all(&c);

    assert!(again.created.is_empty());
    assert_eq!(again.skipped, 4);
}

#[test]
fn generation_response_omits_empty_failures() {
    let c = chair();
    let body = serde_json::to_value(generate_all(&c)).unwrap();
    assert_eq!(body["skipped"], 0);
    assert!(body.get("failed").is_none());
}

#[test]
fn complete_selection_resolves_and_partial_does_not() {
    let c = chair();
    generate_all(&c);

    let request = SelectionRequest {
        product_id: c.product.id.to_string(),
        selection: [
            (c.style.to_string(), Some(c.a.to_string())),
            (c.material.to_string(), Some(c.x.to_string())),
            (c.finish.to_string(), None),
        ]
        .into_iter()
        .collect(),
    };
    let (product_id, selection) = request.into_parts().unwrap();
    let sku = c.service.resolve_sku(product_id, &selection).unwrap().unwrap();
    assert_eq!(sku.price, Price(100));

    let partial = Selection::new().with(c.style, c.a);
    let response = ResolveSkuResponse {
        sku: c.service.resolve_sku(c.product.id, &partial).unwrap(),
    };
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({ "sku": null }));
}

#[test]
fn selected_variant_image_wins_over_product_image() {
    let c = chair();
    generate_all(&c);

    let with_b = Selection::new().with(c.style, c.b).with(c.material, c.x);
    let sku = c.service.resolve_sku(c.product.id, &with_b).unwrap().unwrap();
    assert_eq!(sku.image_ref.as_deref(), Some("b.png"));

    let with_a = Selection::new().with(c.style, c.a).with(c.material, c.x);
    let sku = c.service.resolve_sku(c.product.id, &with_a).unwrap().unwrap();
    assert_eq!(sku.image_ref.as_deref(), Some("chair.png"));
}

#[test]
fn unknown_product_and_foreign_variant_are_not_found() {
    let c = chair();
    let err = c
        .service
        .generate_variants(configurator_core::ProductId::new(), &DimensionSelections::new())
        .unwrap_err();
    assert_eq!(err.code(), "not_found");

    let wrong = Selection::new().with(c.material, c.a);
    let err = c.service.resolve_sku(c.product.id, &wrong).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn hotspots_cover_every_property() {
    let c = chair();
    let hotspots = c.service.get_hotspots(c.product.id).unwrap();

    assert_eq!(
        hotspots,
        vec![
            Hotspot::new(c.style, 0.25, 0.3),
            Hotspot::centered(c.material),
            Hotspot::centered(c.finish),
        ]
    );
}

#[test]
fn available_variants_narrow_to_stored_combinations() {
    let c = chair();
    let only_a = DimensionSelections::new()
        .with(c.style, vec![c.a])
        .with(c.material, vec![c.x, c.y]);
    c.service.generate_variants(c.product.id, &only_a).unwrap();

    let styles = c
        .service
        .available_variants(c.product.id, &Selection::new().with(c.material, c.y), c.style)
        .unwrap();
    let ids: Vec<_> = styles.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![c.a]);
}

#[test]
fn combination_guard_comes_from_config() {
    let c = chair();
    let config = EngineConfig {
        max_combinations: 3,
        ..EngineConfig::default()
    };
    let service = ConfiguratorService::from_config(
        c.service.catalog().clone(),
        Arc::new(InMemorySkuStore::new()),
        &config,
    )
    .unwrap();

    let err = service
        .generate_variants(c.product.id, &DimensionSelections::all_variants(&c.product))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(service.skus().len().unwrap(), 0);

    let bad_tolerance = EngineConfig {
        shape_tolerance: 0.9,
        ..EngineConfig::default()
    };
    let err = ConfiguratorService::from_config(
        c.service.catalog().clone(),
        Arc::new(InMemorySkuStore::new()),
        &bad_tolerance,
    )
    .unwrap_err();
    assert_eq!(err.code(), "validation_error");
}

#[test]
fn body_shape_classification_through_the_boundary() {
    let c = chair();
    let classify = |body: serde_json::Value| -> Result<ShapeCategory, ServiceError> {
        let request: MeasurementsRequest = serde_json::from_value(body).unwrap();
        let measurements = Measurements::try_from(request)?;
        c.service.classify_body_shape(&measurements)
    };

    assert_eq!(
        classify(json!({ "chest": 90, "waist": 70, "hips": 95 })).unwrap(),
        ShapeCategory::Hourglass
    );
    assert_eq!(
        classify(json!({ "chest": 90, "waist": 90, "hips": 90 })).unwrap(),
        ShapeCategory::Rectangle
    );
    assert_eq!(
        classify(json!({ "chest": 0, "waist": 90, "hips": 90 }))
            .unwrap_err()
            .code(),
        "validation_error"
    );

    let body = serde_json::to_value(ShapeResponse { shape: ShapeCategory::Hourglass }).unwrap();
    assert_eq!(body, json!({ "shape": "HOURGLASS" }));
}

#[test]
fn null_entries_must_still_name_properties_of_the_product() {
    let c = chair();
    generate_all(&c);

    let known = SelectionRequest {
        product_id: c.product.id.to_string(),
        selection: [
            (c.style.to_string(), Some(c.b.to_string())),
            (c.material.to_string(), Some(c.y.to_string())),
            (c.finish.to_string(), None),
        ]
        .into_iter()
        .collect(),
    };
    let response = c.service.resolve_request(known).unwrap();
    assert_eq!(response.sku.map(|s| s.price), Some(Price(180)));

    let stranger = PropertyId::new();
    let unknown = SelectionRequest {
        product_id: c.product.id.to_string(),
        selection: [
            (c.style.to_string(), Some(c.a.to_string())),
            (stranger.to_string(), None),
        ]
        .into_iter()
        .collect(),
    };
    let err = c.service.resolve_request(unknown).unwrap_err();
    assert_eq!(err.code(), "not_found");
}
