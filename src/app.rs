use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, preview};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TablyApp {
    pub state: AppState,
}

impl eframe::App for TablyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: conversion controls ----
        egui::SidePanel::left("convert_panel")
            .default_width(230.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: chart preview (read-only) ----
        if self.state.show_chart {
            if let Some(dataset) = &self.state.transformed {
                egui::TopBottomPanel::bottom("chart_panel")
                    .default_height(260.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        plot::numeric_bar_chart(ui, dataset);
                    });
            }
        }

        // ---- Central panel: preview table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            preview::preview_table(ui, &self.state);
        });
    }
}
