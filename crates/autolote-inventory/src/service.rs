// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-cached read-through view of the vehicle listings.
//!
//! The whole snapshot is refreshed when the TTL elapses; there is no
//! partial invalidation. Rows are mapped by header name so column order in
//! the sheet can change without code changes.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use autolote_core::{AutoloteError, InventoryProvider, InventorySnapshot, Vehicle};

use crate::sheets::SheetsClient;

/// Filter criteria for vehicle search. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub vehicle_type: Option<String>,
    pub year_min: Option<u32>,
    pub year_max: Option<u32>,
    pub km_max: Option<u64>,
    pub price_max: Option<u64>,
    pub color: Option<String>,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
}

/// Aggregate statistics over the current snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InventoryStats {
    pub total: usize,
    pub by_brand: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub price_avg: Option<u64>,
    pub with_images: usize,
}

struct CachedSnapshot {
    snapshot: InventorySnapshot,
    fetched_at: Instant,
}

/// Inventory service reading the vehicle sheet through a TTL cache.
pub struct InventoryService {
    client: SheetsClient,
    range: String,
    ttl: Duration,
    cache: Mutex<Option<CachedSnapshot>>,
}

impl InventoryService {
    pub fn new(client: SheetsClient, sheet_name: &str, ttl: Duration) -> Self {
        Self {
            client,
            range: format!("{sheet_name}!A:O"),
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// Drop the cached snapshot so the next read refetches.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Fetch, map, and cache a fresh snapshot.
    async fn refresh(&self) -> Result<InventorySnapshot, AutoloteError> {
        let grid = self.client.fetch_values(&self.range).await?;

        let mut rows = grid.values.into_iter();
        let headers = rows.next().unwrap_or_default();

        let mut vehicles = Vec::new();
        for row in rows {
            match vehicle_from_row(&headers, &row) {
                Some(vehicle) => vehicles.push(vehicle),
                None => {
                    if !row.is_empty() {
                        warn!(cells = row.len(), "skipping incomplete inventory row");
                    }
                }
            }
        }

        let snapshot = InventorySnapshot {
            brands: unique_sorted(vehicles.iter().map(|v| v.brand.clone())),
            models: unique_sorted(vehicles.iter().map(|v| v.model.clone())),
            types: unique_sorted(vehicles.iter().filter_map(|v| v.vehicle_type.clone())),
            last_update: Utc::now(),
            vehicles,
        };

        info!(
            vehicles = snapshot.vehicles.len(),
            brands = snapshot.brands.len(),
            "inventory snapshot refreshed"
        );
        Ok(snapshot)
    }

    /// Search the current snapshot with the given criteria.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Vehicle>, AutoloteError> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .vehicles
            .into_iter()
            .filter(|v| matches_criteria(v, criteria))
            .collect())
    }

    /// Aggregate statistics over the current snapshot.
    pub async fn stats(&self) -> Result<InventoryStats, AutoloteError> {
        let snapshot = self.snapshot().await?;

        let mut by_brand: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut prices = Vec::new();
        let mut with_images = 0usize;

        for vehicle in &snapshot.vehicles {
            *by_brand.entry(vehicle.brand.clone()).or_default() += 1;
            if let Some(t) = &vehicle.vehicle_type {
                *by_type.entry(t.clone()).or_default() += 1;
            }
            if let Some(price) = vehicle.price.as_deref().and_then(parse_number) {
                prices.push(price);
            }
            if !vehicle.images.is_empty() {
                with_images += 1;
            }
        }

        let price_avg = if prices.is_empty() {
            None
        } else {
            Some(prices.iter().sum::<u64>() / prices.len() as u64)
        };

        Ok(InventoryStats {
            total: snapshot.vehicles.len(),
            by_brand,
            by_type,
            price_min: prices.iter().min().copied(),
            price_max: prices.iter().max().copied(),
            price_avg,
            with_images,
        })
    }
}

#[async_trait]
impl InventoryProvider for InventoryService {
    async fn snapshot(&self) -> Result<InventorySnapshot, AutoloteError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
        {
            return Ok(cached.snapshot.clone());
        }

        let snapshot = self.refresh().await?;
        *cache = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });
        Ok(snapshot)
    }

    async fn vehicle_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Vehicle>, AutoloteError> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .vehicles
            .into_iter()
            .find(|v| v.reference == reference))
    }
}

/// Map one sheet row into a vehicle using header-name lookup.
///
/// Returns `None` when the reference, brand, or model is missing -- those
/// rows carry no sellable listing. The first three columns double as
/// positional fallbacks for sheets without the canonical header names.
fn vehicle_from_row(headers: &[String], row: &[String]) -> Option<Vehicle> {
    let by_header = |names: &[&str]| -> Option<String> {
        names.iter().find_map(|name| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .and_then(|idx| row.get(idx))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    };
    let positional = |idx: usize| -> Option<String> {
        row.get(idx)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let reference = by_header(&["Referencia_Vehiculo"]).or_else(|| positional(0))?;
    let brand = by_header(&["Marca"]).or_else(|| positional(1))?;
    let model = by_header(&["Modelo"]).or_else(|| positional(2))?;

    let images = by_header(&["Imagenes"])
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Vehicle {
        reference,
        brand,
        model,
        year: by_header(&["Año", "Ano", "Year"]),
        mileage_km: by_header(&["KM", "Kilometraje"]),
        vehicle_type: by_header(&["Tipo_Vehiculo", "Tipo"]),
        price: by_header(&["Precio"]),
        color: by_header(&["Color"]),
        transmission: by_header(&["Transmision"]),
        fuel: by_header(&["Combustible"]),
        engine: by_header(&["Cilindraje"]),
        description: by_header(&["Descripcion"]),
        location: by_header(&["Ubicacion"]),
        images,
    })
}

fn matches_criteria(vehicle: &Vehicle, criteria: &SearchCriteria) -> bool {
    let contains = |field: &Option<String>, needle: &Option<String>| -> bool {
        match needle {
            None => true,
            Some(needle) => field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase())),
        }
    };

    if let Some(brand) = &criteria.brand
        && !vehicle.brand.to_lowercase().contains(&brand.to_lowercase())
    {
        return false;
    }
    if let Some(model) = &criteria.model
        && !vehicle.model.to_lowercase().contains(&model.to_lowercase())
    {
        return false;
    }
    if !contains(&vehicle.vehicle_type, &criteria.vehicle_type)
        || !contains(&vehicle.color, &criteria.color)
        || !contains(&vehicle.transmission, &criteria.transmission)
        || !contains(&vehicle.fuel, &criteria.fuel)
    {
        return false;
    }

    let year = vehicle.year.as_deref().and_then(|y| y.parse::<u32>().ok());
    if let Some(min) = criteria.year_min
        && !year.is_some_and(|y| y >= min)
    {
        return false;
    }
    if let Some(max) = criteria.year_max
        && !year.is_some_and(|y| y <= max)
    {
        return false;
    }

    if let Some(km_max) = criteria.km_max
        && !vehicle
            .mileage_km
            .as_deref()
            .and_then(parse_number)
            .is_some_and(|km| km <= km_max)
    {
        return false;
    }

    // Unpriced vehicles pass the price filter, matching the sheet's habit of
    // leaving the column blank while negotiating.
    if let Some(price_max) = criteria.price_max
        && vehicle
            .price
            .as_deref()
            .and_then(parse_number)
            .is_some_and(|p| p > price_max)
    {
        return false;
    }

    true
}

/// Parse a number out of a formatted cell ("45.000.000" or "45000000 COP").
fn parse_number(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn unique_sorted(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = values.filter(|v| !v.is_empty()).collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn grid_body() -> serde_json::Value {
        serde_json::json!({
            "values": [
                ["Referencia_Vehiculo", "Marca", "Modelo", "Año", "KM", "Tipo_Vehiculo", "Precio", "Imagenes"],
                ["VEH001", "Toyota", "Corolla", "2020", "45000", "Sedan", "75000000", "https://img/1.jpg, https://img/2.jpg"],
                ["VEH002", "Mazda", "CX-5", "2022", "18000", "SUV", "120000000", ""],
                ["", "Nissan", "March"],
            ]
        })
    }

    async fn service_against(server: &MockServer, ttl: Duration) -> InventoryService {
        let client = SheetsClient::new("sheet-1".into(), None)
            .unwrap()
            .with_base_url(server.uri());
        InventoryService::new(client, "Inventario", ttl)
    }

    #[tokio::test]
    async fn snapshot_maps_rows_and_skips_incomplete_ones() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
            .mount(&server)
            .await;

        let service = service_against(&server, Duration::from_secs(300)).await;
        let snapshot = service.snapshot().await.unwrap();

        assert_eq!(snapshot.vehicles.len(), 2, "row without reference dropped");
        assert_eq!(snapshot.brands, vec!["Mazda", "Toyota"]);
        let toyota = &snapshot.vehicles[0];
        assert_eq!(toyota.reference, "VEH001");
        assert_eq!(toyota.images.len(), 2);
    }

    #[tokio::test]
    async fn cache_serves_until_ttl_elapses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_against(&server, Duration::from_secs(300)).await;
        service.snapshot().await.unwrap();
        service.snapshot().await.unwrap();
        // Mock expectation of exactly one upstream fetch is verified on drop.
    }

    #[tokio::test]
    async fn cache_refreshes_after_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
            .expect(2)
            .mount(&server)
            .await;

        // Zero TTL: every read is past expiry and refetches.
        let service = service_against(&server, Duration::ZERO).await;
        service.snapshot().await.unwrap();
        service.snapshot().await.unwrap();
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
            .expect(2)
            .mount(&server)
            .await;

        let service = service_against(&server, Duration::from_secs(300)).await;
        service.snapshot().await.unwrap();
        service.invalidate().await;
        service.snapshot().await.unwrap();
    }

    #[tokio::test]
    async fn vehicle_by_reference_finds_exact_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
            .mount(&server)
            .await;

        let service = service_against(&server, Duration::from_secs(300)).await;
        let found = service.vehicle_by_reference("VEH002").await.unwrap();
        assert_eq!(found.unwrap().brand, "Mazda");
        assert!(service
            .vehicle_by_reference("VEH999")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn search_filters_by_brand_and_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
            .mount(&server)
            .await;

        let service = service_against(&server, Duration::from_secs(300)).await;

        let criteria = SearchCriteria {
            brand: Some("toyota".into()),
            ..Default::default()
        };
        let results = service.search(&criteria).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reference, "VEH001");

        let criteria = SearchCriteria {
            price_max: Some(80_000_000),
            ..Default::default()
        };
        let results = service.search(&criteria).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reference, "VEH001");
    }

    #[tokio::test]
    async fn stats_aggregate_brands_prices_and_images() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
            .mount(&server)
            .await;

        let service = service_against(&server, Duration::from_secs(300)).await;
        let stats = service.stats().await.unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_brand.get("Toyota"), Some(&1));
        assert_eq!(stats.price_min, Some(75_000_000));
        assert_eq!(stats.price_max, Some(120_000_000));
        assert_eq!(stats.with_images, 1);
    }

    #[test]
    fn parse_number_handles_separators() {
        assert_eq!(parse_number("45.000.000"), Some(45_000_000));
        assert_eq!(parse_number("18000 km"), Some(18_000));
        assert_eq!(parse_number("n/a"), None);
    }
}
