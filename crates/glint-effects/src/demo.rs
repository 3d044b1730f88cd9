//! A small legal page with every element the effects know about.
//!
//! Used by the CLI and by the director tests.

use crate::ambient::{AmbientGlitch, AmbientTargets};
use crate::cursor::{CursorTargets, CursorTrail};
use crate::director::Director;
use crate::easter_egg::{EasterEgg, EggTargets};
use crate::scroll::{ScrollEffects, ScrollTargets};
use crate::splash::SplashScreen;
use crate::text::{TextEffects, TextTargets};
use glint_core::{EffectConfig, ElementId};
use glint_particles::{DrawList, FieldOptions, ParticleField, ParticleSystem};
use glint_runtime::{Page, Stage, Viewport};

const SECTION_HEIGHT: f32 = 600.0;

/// Handles to the demo page's elements
#[derive(Debug, Clone)]
pub struct DemoPage {
    pub header_logo: ElementId,
    pub company_name: ElementId,
    pub hero_logo: ElementId,
    pub title: ElementId,
    pub subtitle: ElementId,
    pub content: ElementId,
    pub gradient: ElementId,
    pub crt: ElementId,
    pub glitch_elements: Vec<ElementId>,
    pub headings: Vec<ElementId>,
    pub paragraphs: Vec<ElementId>,
    pub lists: Vec<(ElementId, Vec<ElementId>)>,
    pub links: Vec<ElementId>,
    pub footer: ElementId,
    pub smiley: ElementId,
}

impl DemoPage {
    /// Lay out `sections` headed sections below the hero on `page`
    pub fn build(page: &mut Page, sections: usize) -> Self {
        let root = page.root();
        let header = page.create_in(root, "header");
        let header_logo = page.create_in(header, "img");
        let company_name = page.create_in(header, "span");
        page.set_text(company_name, "Glint Holdings");

        let hero = page.create_in(root, "section");
        let hero_logo = page.create_in(hero, "img");
        let title = page.create_in(hero, "h1");
        page.set_text(title, "Terms & Conditions");
        page.set_data(title, "text", "Terms & Conditions");
        page.add_class(title, "glitch-text");
        let subtitle = page.create_in(hero, "p");
        page.set_text(subtitle, "Read carefully. Or don't.");
        page.set_layout(title, 120.0, 80.0);

        let gradient = page.create_in(root, "div");
        page.add_class(gradient, "bg-gradient");
        let crt = page.create_in(root, "div");
        page.add_class(crt, "crt-flicker");
        let glitch_elements = (0..4)
            .map(|_| {
                let blip = page.create_in(root, "div");
                page.add_class(blip, "glitch-element");
                blip
            })
            .collect();

        let content = page.create_in(root, "main");
        let mut headings = Vec::new();
        let mut paragraphs = Vec::new();
        let mut lists = Vec::new();
        let mut links = Vec::new();
        for i in 0..sections {
            let top = SECTION_HEIGHT * (i as f32 + 1.0);
            let heading = page.create_in(content, "h2");
            page.set_text(heading, format!("Section {}", i + 1));
            page.set_layout(heading, top, 40.0);
            headings.push(heading);

            let paragraph = page.create_in(content, "p");
            page.set_text(paragraph, "The party of the first part reserves every right.");
            page.set_layout(paragraph, top + 60.0, 120.0);
            paragraphs.push(paragraph);

            let link = page.create_in(paragraph, "a");
            page.set_text(link, "see appendix");
            links.push(link);

            let list = page.create_in(content, "ul");
            page.set_layout(list, top + 200.0, 150.0);
            let items = (0..3)
                .map(|n| {
                    let item = page.create_in(list, "li");
                    page.set_text(item, format!("Clause {}.{}", i + 1, n + 1));
                    item
                })
                .collect();
            lists.push((list, items));
        }

        let footer = page.create_in(root, "footer");
        let doc_height = SECTION_HEIGHT * (sections as f32 + 1.0) + 200.0;
        page.set_layout(footer, doc_height - 200.0, 200.0);
        page.set_text(footer, "(c) Glint Holdings. All rights reserved.");
        let smiley = page.create_in(footer, "span");
        page.set_text(smiley, ":)");
        page.set_document_height(doc_height);

        Self {
            header_logo,
            company_name,
            hero_logo,
            title,
            subtitle,
            content,
            gradient,
            crt,
            glitch_elements,
            headings,
            paragraphs,
            lists,
            links,
            footer,
            smiley,
        }
    }

    /// A director running every effect against this page
    pub fn director(&self, stage: Stage) -> Director {
        let root = stage.page.root();
        let field = ParticleField::new(
            Some(root),
            stage.config.particles.clone(),
            FieldOptions::default(),
            &stage.motion,
            DrawList::new(),
        );

        let mut director = Director::new(stage);
        director.add_system(Box::new(SplashScreen::new(Some(root))));
        director.add_system(Box::new(ParticleSystem::new(field)));
        director.add_system(Box::new(ScrollEffects::new(ScrollTargets {
            host: Some(root),
            // the title belongs to the ambient glitch, so it is not scrubbed
            parallax_headings: self.headings.clone(),
            glitch_headings: self.headings.clone(),
            paragraphs: self.paragraphs.clone(),
            lists: self.lists.clone(),
            gradient: Some(self.gradient),
        })));
        director.add_system(Box::new(CursorTrail::new(CursorTargets {
            host: Some(root),
            links: self.links.clone(),
            headings: self.headings.clone(),
        })));
        director.add_system(Box::new(TextEffects::new(TextTargets {
            host: Some(root),
            headline: Some(self.title),
            headings: self.headings.clone(),
            links: self.links.clone(),
            footers: vec![self.footer],
            smiley: Some(self.smiley),
        })));
        director.add_system(Box::new(AmbientGlitch::new(AmbientTargets {
            title: Some(self.title),
            hero_logo: Some(self.hero_logo),
            header_logo: Some(self.header_logo),
            company_name: Some(self.company_name),
            subtitle: Some(self.subtitle),
            gradient: Some(self.gradient),
            crt: Some(self.crt),
            glitch_elements: self.glitch_elements.clone(),
        })));
        director.add_system(Box::new(EasterEgg::new(EggTargets {
            logo: Some(self.header_logo),
            title: Some(self.title),
            subtitle: Some(self.subtitle),
            content: Some(self.content),
            shouters: self.headings.clone(),
        })));
        director
    }
}

/// Build the demo page on a fresh stage and wire up a director for it
pub fn demo(
    viewport: Viewport,
    config: EffectConfig,
    reduced_motion: bool,
    seed: u32,
    sections: usize,
) -> (Director, DemoPage) {
    let mut page = Page::new(viewport);
    let handles = DemoPage::build(&mut page, sections);
    let stage = Stage::new(page, config, reduced_motion, seed);
    (handles.director(stage), handles)
}
