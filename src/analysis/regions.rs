//! Region browser: grouping places into regions, search and pagination.

use crate::models::{PlaceRecord, RegionKind, RegionSummary};
use std::collections::HashMap;

/// Default number of regions per page.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Display name of the region a place belongs to.
///
/// "neighborhood - city" when the neighborhood is known, otherwise the city.
pub fn region_name(place: &PlaceRecord) -> (String, RegionKind) {
    let address = &place.address;
    if address.neighborhood.trim().is_empty() {
        (address.city.clone(), RegionKind::Cidade)
    } else {
        (
            format!("{} - {}", address.neighborhood, address.city),
            RegionKind::Bairro,
        )
    }
}

/// Group places into regions, in first-appearance order.
///
/// The first place seen for a region supplies its state, population and
/// coordinates; event counts are summed over every place in the region.
pub fn group_regions(places: &[PlaceRecord]) -> Vec<RegionSummary> {
    let mut regions: Vec<RegionSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for place in places {
        let (name, kind) = region_name(place);

        match index.get(&name) {
            Some(&slot) => regions[slot].total_events += place.events.len(),
            None => {
                index.insert(name.clone(), regions.len());
                regions.push(RegionSummary {
                    id: regions.len() + 1,
                    name,
                    kind,
                    state: place.address.state.clone(),
                    population: place.address.population,
                    latitude: place.address.latitude,
                    longitude: place.address.longitude,
                    total_events: place.events.len(),
                    active: true,
                });
            }
        }
    }

    regions
}

/// Search, type filter and page selection for the region browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionQuery {
    /// Case-insensitive substring of the name or state.
    pub search: Option<String>,
    /// Case-insensitive substring of the region kind ("bairro", "cidade").
    pub kind: Option<String>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
}

impl Default for RegionQuery {
    fn default() -> Self {
        Self {
            search: None,
            kind: None,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of region browser results plus totals over every match.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPage {
    pub items: Vec<RegionSummary>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub total_events: usize,
    pub total_population: u64,
}

impl RegionQuery {
    fn matches(&self, region: &RegionSummary) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !region.name.to_lowercase().contains(&needle)
                && !region.state.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(ref kind) = self.kind {
            if !region.kind.key().contains(&kind.to_lowercase()) {
                return false;
            }
        }

        true
    }

    /// Run the query. Pages past the end come back empty.
    pub fn run(&self, regions: &[RegionSummary]) -> RegionPage {
        let matches: Vec<&RegionSummary> = regions.iter().filter(|r| self.matches(r)).collect();

        let per_page = self.per_page.max(1);
        let page = self.page.max(1);
        let total_pages = matches.len().div_ceil(per_page);

        let items = matches
            .iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .map(|r| (*r).clone())
            .collect();

        RegionPage {
            items,
            page,
            total_pages,
            total_matches: matches.len(),
            total_events: matches.iter().map(|r| r.total_events).sum(),
            total_population: matches
                .iter()
                .map(|r| r.population)
                .fold(0u64, u64::saturating_add),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, EventRecord};

    fn create_place(neighborhood: &str, city: &str, state: &str, events: usize) -> PlaceRecord {
        PlaceRecord {
            name: format!("Espaço {}", neighborhood),
            address: Address {
                neighborhood: neighborhood.to_string(),
                city: city.to_string(),
                state: state.to_string(),
                population: 1000,
                ..Default::default()
            },
            events: vec![EventRecord::default(); events],
            ..Default::default()
        }
    }

    fn sample_regions() -> Vec<RegionSummary> {
        group_regions(&[
            create_place("Pinheiros", "São Paulo", "SP", 2),
            create_place("", "Campinas", "SP", 1),
            create_place("Pinheiros", "São Paulo", "SP", 3),
            create_place("Savassi", "Belo Horizonte", "MG", 4),
        ])
    }

    #[test]
    fn test_group_regions() {
        let regions = sample_regions();

        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].id, 1);
        assert_eq!(regions[0].name, "Pinheiros - São Paulo");
        assert_eq!(regions[0].kind, RegionKind::Bairro);
        assert_eq!(regions[0].total_events, 5);
        assert_eq!(regions[0].population, 1000);
        assert_eq!(regions[1].name, "Campinas");
        assert_eq!(regions[1].kind, RegionKind::Cidade);
        assert_eq!(regions[2].id, 3);
    }

    #[test]
    fn test_search_by_name_or_state() {
        let regions = sample_regions();

        let query = RegionQuery {
            search: Some("mg".to_string()),
            ..Default::default()
        };
        let page = query.run(&regions);
        assert_eq!(page.total_matches, 1);
        assert_eq!(page.items[0].name, "Savassi - Belo Horizonte");

        let query = RegionQuery {
            search: Some("SÃO".to_string()),
            ..Default::default()
        };
        assert_eq!(query.run(&regions).total_matches, 1);
    }

    #[test]
    fn test_kind_filter() {
        let regions = sample_regions();
        let query = RegionQuery {
            kind: Some("Cidade".to_string()),
            ..Default::default()
        };
        let page = query.run(&regions);

        assert_eq!(page.total_matches, 1);
        assert_eq!(page.total_events, 1);
    }

    #[test]
    fn test_pagination() {
        let regions = sample_regions();
        let query = RegionQuery {
            page: 2,
            per_page: 2,
            ..Default::default()
        };
        let page = query.run(&regions);

        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Savassi - Belo Horizonte");
        assert_eq!(page.total_events, 10);
        assert_eq!(page.total_population, 3000);

        let beyond = RegionQuery {
            page: 9,
            per_page: 2,
            ..Default::default()
        };
        assert!(beyond.run(&regions).items.is_empty());
    }

    #[test]
    fn test_extreme_page_numbers() {
        let regions = sample_regions();
        let last = RegionQuery {
            page: usize::MAX,
            per_page: 2,
            ..Default::default()
        };
        let page = last.run(&regions);
        assert!(page.items.is_empty());
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.total_matches, 3);

        let wide = RegionQuery {
            page: usize::MAX,
            per_page: usize::MAX,
            ..Default::default()
        };
        assert!(wide.run(&regions).items.is_empty());
    }

    #[test]
    fn test_population_total_saturates() {
        let mut regions = sample_regions();
        for region in &mut regions {
            region.population = u64::MAX;
        }
        let page = RegionQuery::default().run(&regions);
        assert_eq!(page.total_population, u64::MAX);
    }

    #[test]
    fn test_no_matches() {
        let page = RegionQuery::default().run(&[]);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_matches, 0);
    }
}
