// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;

use fwforge::scanner::report_path;
use fwforge::*;

use crate::common::Workspace;

/// Writes canned dependency listings to the build area, then reads them back
/// the way the real generator does.
struct DiskReports {
    build_dir: std::path::PathBuf,
    listings: BTreeMap<String, String>,
}

impl ReportGenerator for DiskReports {
    fn generate(&self, source_dir: &Path, _flags: &IncludeFlagSet) -> fwforge::Result<UsageReport> {
        let path = report_path(&self.build_dir, source_dir);
        let name = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let listing = self.listings.get(&name).cloned().unwrap_or_default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ResolveError::ArtifactUnreadable {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, listing).map_err(|source| ResolveError::ArtifactUnreadable {
            path: path.clone(),
            source,
        })?;
        UsageReport::read(&path)
    }
}

fn servo_workspace() -> Result<Workspace> {
    let ws = Workspace::new()?;
    ws.write("arduino/libraries/Servo/Servo.h", "#include \"utility/util.h\"\n")?;
    ws.write("arduino/libraries/Servo/Servo.cpp", "")?;
    ws.write("arduino/libraries/Servo/utility/util.h", "")?;
    ws.write("arduino/libraries/Servo/examples/Sweep/Sweep.ino", "")?;
    ws.write("arduino/libraries/Wire/Wire.h", "")?;
    Ok(ws)
}

#[test]
fn servo_project_resolves_and_plans() -> Result<()> {
    let ws = servo_workspace()?;
    let servo = ws.libraries().join("Servo");

    let mut listings = BTreeMap::new();
    listings.insert(
        "src".to_string(),
        format!(
            "main.ino.o: {src}/main.ino {servo}/Servo.h \\\n {servo}/utility/util.h\n",
            src = ws.src().display(),
            servo = servo.display()
        ),
    );
    listings.insert(
        "Servo".to_string(),
        format!(
            "Servo.cpp.o: {servo}/Servo.cpp {servo}/Servo.h {servo}/utility/util.h\n",
            servo = servo.display()
        ),
    );

    let catalog = LibraryCatalog::discover(&ws.collections(), &["examples".to_string()])?;
    assert_eq!(catalog.len(), 2);

    let generator = DiskReports {
        build_dir: ws.build_dir(),
        listings,
    };
    let scanner = HeaderUsageScanner::new(generator, &catalog)?;
    let excluded = vec!["examples".to_string()];
    let resolved = DependencyResolver::new(&scanner, &excluded).resolve(&ws.src())?;

    let names: Vec<String> = resolved.libraries.iter().map(LibraryRoot::name).collect();
    assert_eq!(names, vec!["Servo".to_string()]);
    assert_eq!(resolved.scanned, vec![ws.src(), servo.clone()]);
    assert_eq!(
        resolved.reports,
        vec![
            ws.build_dir().join("src/dependencies.d"),
            ws.build_dir().join("Servo/dependencies.d"),
        ]
    );

    let plan = BuildPlanAssembler::new(&excluded).assemble(Default::default(), &resolved)?;
    assert_eq!(plan.include_flags.dirs(), &[servo.clone(), servo.join("utility")]);
    assert!(!plan.include_flags.contains(&servo.join("examples")));
    let servo_flag = format!("-I{}", servo.display());
    assert!(plan.flags.cflags.contains(&servo_flag));
    assert_eq!(plan.libraries.len(), 1);

    // Unchanged tree, unchanged answer.
    let again = DependencyResolver::new(&scanner, &excluded).resolve(&ws.src())?;
    assert_eq!(again.libraries, resolved.libraries);
    Ok(())
}

#[test]
fn project_without_libraries_builds_alone() -> Result<()> {
    let ws = servo_workspace()?;
    let catalog = LibraryCatalog::discover(&ws.collections(), &["examples".to_string()])?;
    let mut listings = BTreeMap::new();
    listings.insert(
        "src".to_string(),
        format!("main.ino.o: {}/main.ino\n", ws.src().display()),
    );

    let generator = DiskReports {
        build_dir: ws.build_dir(),
        listings,
    };
    let scanner = HeaderUsageScanner::new(generator, &catalog)?;
    let resolved = DependencyResolver::new(&scanner, &[]).resolve(&ws.src())?;
    assert!(resolved.is_empty());

    let plan = BuildPlanAssembler::new(&[]).assemble(Default::default(), &resolved)?;
    assert!(plan.include_flags.is_empty());
    assert!(plan.libraries.is_empty());
    Ok(())
}

#[test]
fn local_library_pulls_in_standard_library() -> Result<()> {
    let ws = servo_workspace()?;
    ws.write("project/lib/Blinker/Blinker.h", "")?;
    let blinker = ws.project().join("lib/Blinker");

    let catalog = LibraryCatalog::discover(&ws.collections(), &[])?;
    assert_eq!(
        catalog.get(&blinker).map(LibraryRoot::origin),
        Some(LibraryOrigin::Local)
    );

    let mut listings = BTreeMap::new();
    listings.insert(
        "src".to_string(),
        format!(
            "main.ino.o: {}/main.ino {}/Blinker.h\n",
            ws.src().display(),
            blinker.display()
        ),
    );
    listings.insert(
        "Blinker".to_string(),
        format!("x.o: {}/Wire/Wire.h\n", ws.libraries().display()),
    );

    let generator = DiskReports {
        build_dir: ws.build_dir(),
        listings,
    };
    let scanner = HeaderUsageScanner::new(generator, &catalog)?;
    let resolved = DependencyResolver::new(&scanner, &[]).resolve(&ws.src())?;
    let names: Vec<String> = resolved.libraries.iter().map(LibraryRoot::name).collect();
    assert_eq!(names, vec!["Wire".to_string(), "Blinker".to_string()]);
    Ok(())
}
