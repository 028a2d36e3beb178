//! Trade service: options plus the current catalog snapshot
//!
//! The catalog is shared through an `Arc`. A reload builds a complete new
//! catalog and swaps the pointer, so anyone holding the previous snapshot
//! keeps reading a consistent catalog.

use std::sync::Arc;

use crate::events::{self, AcquireOutcome, Merchant, RerollError, VanillaOffer};
use crate::options::TradeOptions;
use crate::rng::RandomSource;
use crate::trade::{load_file, InstanceTradeLedger, LoadError, LoadReport, TradeCatalog, TradeDefinition};
use crate::villager::{Profession, VillagerId};

#[derive(Debug, Clone)]
pub struct TradeService {
    options: TradeOptions,
    catalog: Arc<TradeCatalog>,
    report: LoadReport,
}

impl TradeService {
    /// Build the service, loading the configured definition file
    ///
    /// With `custom_trades` off the catalog starts empty and no file is read.
    /// Otherwise a missing definition file is a [`LoadError::Io`]; no default
    /// file is written in its place.
    pub fn load(options: TradeOptions) -> Result<Self, LoadError> {
        let (catalog, report) = build_catalog(&options)?;
        Ok(Self {
            options,
            catalog: Arc::new(catalog),
            report,
        })
    }

    /// Wrap an already built catalog
    pub fn from_catalog(options: TradeOptions, catalog: TradeCatalog) -> Self {
        let report = LoadReport {
            loaded: catalog.len(),
            total: catalog.len(),
            failures: Vec::new(),
        };
        Self {
            options,
            catalog: Arc::new(catalog),
            report,
        }
    }

    /// Rebuild the catalog from the configured source and publish it
    ///
    /// On error the current snapshot stays in place.
    pub fn reload(&mut self) -> Result<&LoadReport, LoadError> {
        let (catalog, report) = build_catalog(&self.options)?;
        self.catalog = Arc::new(catalog);
        self.report = report;
        tracing::info!(trades = self.catalog.len(), "Reloaded trade catalog");
        Ok(&self.report)
    }

    /// Swap in new options, then reload
    pub fn reload_with(&mut self, options: TradeOptions) -> Result<&LoadReport, LoadError> {
        let (catalog, report) = build_catalog(&options)?;
        self.options = options;
        self.catalog = Arc::new(catalog);
        self.report = report;
        Ok(&self.report)
    }

    /// Publish a catalog built elsewhere
    pub fn replace_catalog(&mut self, catalog: TradeCatalog) {
        self.report = LoadReport {
            loaded: catalog.len(),
            total: catalog.len(),
            failures: Vec::new(),
        };
        self.catalog = Arc::new(catalog);
    }

    /// Shared handle to the current catalog
    pub fn snapshot(&self) -> Arc<TradeCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn catalog(&self) -> &TradeCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &TradeOptions {
        &self.options
    }

    /// Report of the last load
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn acquire_trade<L, R>(
        &self,
        ledger: &mut L,
        merchant: &Merchant,
        offer: VanillaOffer,
        rng: &mut R,
    ) -> AcquireOutcome<'_>
    where
        L: InstanceTradeLedger + ?Sized,
        R: RandomSource + ?Sized,
    {
        events::acquire_trade(&self.catalog, ledger, &self.options, merchant, offer, rng)
    }

    pub fn profession_changed<L>(&self, ledger: &mut L, villager: &VillagerId, profession: Profession) -> bool
    where
        L: InstanceTradeLedger + ?Sized,
    {
        events::profession_changed(ledger, villager, profession)
    }

    pub fn transform<L>(&self, ledger: &mut L, from: &VillagerId, to: &VillagerId) -> bool
    where
        L: InstanceTradeLedger + ?Sized,
    {
        events::transform(ledger, from, to)
    }

    pub fn manual_reroll<L, R>(
        &self,
        ledger: &mut L,
        merchant: &Merchant,
        rng: &mut R,
    ) -> Result<Vec<&TradeDefinition>, RerollError>
    where
        L: InstanceTradeLedger + ?Sized,
        R: RandomSource + ?Sized,
    {
        events::manual_reroll(&self.catalog, ledger, merchant, rng)
    }
}

fn build_catalog(options: &TradeOptions) -> Result<(TradeCatalog, LoadReport), LoadError> {
    let mut catalog = TradeCatalog::new();
    if !options.custom_trades {
        tracing::info!("Custom trades disabled, catalog left empty");
        return Ok((catalog, LoadReport::default()));
    }

    let report = load_file(&mut catalog, &options.trades)?;
    Ok((catalog, report))
}
