//! Project, solution and readme files that turn a translated resource tree
//! into a buildable NuGet language pack.

use crate::config::PackageSettings;
use crate::resx::escape_value;
use anyhow::{Context, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Visual Studio project type GUID for C# projects.
const CSHARP_PROJECT_TYPE: &str = "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC";

/// Paths of the files written for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFiles {
    pub project: PathBuf,
    pub solution: PathBuf,
    pub readme: PathBuf,
}

/// A random GUID in upper-case registry format (version 4 layout).
pub fn new_project_guid() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Configured values are entity-escaped, so `Acme & Co` stays well-formed.
pub fn render_project(culture_code: &str, version: &str, settings: &PackageSettings) -> String {
    let package_id = format!(
        "{}.{}",
        settings.assembly_prefix,
        culture_code.replace('-', "")
    );

    format!(
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>{framework}</TargetFramework>
    <GenerateAssemblyInfo>false</GenerateAssemblyInfo>
    <AssemblyName>{assembly}.{culture}</AssemblyName>
    <RootNamespace>{namespace}</RootNamespace>
    <Culture>{culture}</Culture>
    <OutputType>Library</OutputType>
    <NoCode>true</NoCode>
    <GeneratePackageOnBuild>true</GeneratePackageOnBuild>
    <PackageId>{package_id}</PackageId>
    <Version>{version}</Version>
    <Authors>{authors}</Authors>
    <Description>Language resources for {product} ({culture})</Description>
    <Copyright>{authors}</Copyright>
    <PackageLicenseExpression>MIT</PackageLicenseExpression>
    <PackageProjectUrl>https://github.com/oqtane/oqtane.framework</PackageProjectUrl>
    <PackageTags>oqtane language pack</PackageTags>
    <PackageReadmeFile>README.md</PackageReadmeFile>
  </PropertyGroup>
  <ItemGroup>
    <EmbeddedResource Include="*.{culture}.resx" LogicalName="{namespace}.%(Filename).resources" />
    <EmbeddedResource Include="**/*.{culture}.resx" LogicalName="{namespace}.%(RecursiveDir)%(Filename).resources" />
    <None Include="README.md" Pack="true" PackagePath="" />
  </ItemGroup>
</Project>
"#,
        framework = escape_value(&settings.target_framework),
        assembly = escape_value(&settings.assembly_prefix),
        namespace = escape_value(&settings.root_namespace),
        culture = escape_value(culture_code),
        package_id = escape_value(&package_id),
        version = escape_value(version),
        authors = escape_value(&settings.authors),
        product = escape_value(&settings.product_name),
    )
}

pub fn render_solution(package_name: &str, project_guid: &str) -> String {
    format!(
        "Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio Version 17
VisualStudioVersion = 17.0.31903.59
MinimumVisualStudioVersion = 10.0.40219.1
Project(\"{{{project_type}}}\") = \"{name}\", \"{name}.csproj\", \"{{{guid}}}\"
EndProject
Global
\tGlobalSection(SolutionConfigurationPlatforms) = preSolution
\t\tRelease|Any CPU = Release|Any CPU
\tEndGlobalSection
\tGlobalSection(ProjectConfigurationPlatforms) = postSolution
\t\t{{{guid}}}.Release|Any CPU.ActiveCfg = Release|Any CPU
\t\t{{{guid}}}.Release|Any CPU.Build.0 = Release|Any CPU
\tEndGlobalSection
EndGlobal
",
        project_type = CSHARP_PROJECT_TYPE,
        name = package_name,
        guid = project_guid,
    )
}

pub fn render_readme(culture_code: &str, version: &str, settings: &PackageSettings) -> String {
    format!(
        "# Language Pack {culture}

This package provides ({culture}) language resources for {product} {version}.

## Installation
- Copy the .nupkg to {install_path} and restart the application.
- Add '{culture}' in the Language Manager.

Generated with machine translation by {tool} {tool_version}.
",
        culture = culture_code,
        product = settings.product_name,
        version = version,
        install_path = settings.install_path,
        tool = env!("CARGO_PKG_NAME"),
        tool_version = env!("CARGO_PKG_VERSION"),
    )
}

/// Write `{name}.csproj`, `{name}.sln` and `README.md` into `output_dir`,
/// replacing any existing files.
pub fn write_package_files(
    output_dir: &Path,
    package_name: &str,
    culture_code: &str,
    version: &str,
    settings: &PackageSettings,
) -> Result<PackageFiles> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let files = PackageFiles {
        project: output_dir.join(format!("{}.csproj", package_name)),
        solution: output_dir.join(format!("{}.sln", package_name)),
        readme: output_dir.join("README.md"),
    };

    write_file(
        &files.project,
        &render_project(culture_code, version, settings),
    )?;
    write_file(
        &files.solution,
        &render_solution(package_name, &new_project_guid()),
    )?;
    write_file(&files.readme, &render_readme(culture_code, version, settings))?;

    Ok(files)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Created {}", path.display());
    Ok(())
}
