impl FilterPatternsLayer {
    /// Appends this layer's patterns onto an accumulating [`FilterPatterns`].
    /// Patterns are additive across layers, not overriding — a later layer
    /// widens the filter, it doesn't replace earlier rules.
    fn extend_into(&self, patterns: &mut FilterPatterns) {
        patterns.want.extend(self.want.iter().cloned());
        patterns.want_exclude.extend(self.want_exclude.iter().cloned());
        patterns.always_want.extend(self.always_want.iter().cloned());
        patterns.keep.extend(self.keep.iter().cloned());
        patterns.keep_exclude.extend(self.keep_exclude.iter().cloned());
    }
}

impl BoardsConfig {
    fn apply_layer(&mut self, layer: &BoardsLayer) {
        for (group, boards) in &layer.groups {
            self.groups.insert(group.clone(), boards.clone());
        }
    }
}

impl RunSettings {
    fn apply_layer(&mut self, layer: &RunSettingsLayer) {
        if let Some(v) = layer.verbose {
            self.verbose = v;
        }
        if let Some(v) = layer.quiet {
            self.quiet = v;
        }
        if let Some(v) = layer.dry_run {
            self.dry_run = v;
        }
        if let Some(v) = layer.k_setup {
            self.k_setup = v;
        }
        if let Some(v) = layer.k_build {
            self.k_build = v;
        }
        if let Some(v) = layer.k_emerge {
            self.k_emerge = v;
        }
        if let Some(key) = layer.annotation_key.as_ref() {
            self.annotation_key = key.clone();
        }
    }
}
